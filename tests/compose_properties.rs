//! Structural properties of composed declaration graphs
//!
//! Covers referential integrity, command interpolation, load-balancer and
//! access-policy shape per variant, capacity bounds, determinism, and
//! tolerance of an absent deployment target.

use goval_stack::compose::compose;
use goval_stack::config::DeployEnv;
use goval_stack::stack::{
    ComputeMode, Credentials, Direction, LogicalId, PortRange, ResourceSpec, SecretRef,
};
use goval_stack::variant::{BatchFetchConfig, DeploymentVariant};
use yare::parameterized;

fn variant_by_name(name: &str) -> DeploymentVariant {
    name.parse().unwrap()
}

fn composed(name: &str) -> goval_stack::DeclarationGraph {
    compose(&DeployEnv::default(), &variant_by_name(name)).unwrap()
}

fn service_of(graph: &goval_stack::DeclarationGraph) -> &goval_stack::stack::ServiceSpec {
    let resource = graph.of_kind("service").next().unwrap();
    match &resource.spec {
        ResourceSpec::Service(spec) => spec,
        _ => unreachable!(),
    }
}

#[parameterized(
    batch_fetch = { "batch-fetch" },
    server = { "server" },
    server_ec2 = { "server-ec2" },
)]
fn every_variant_has_one_cluster_task_and_service(name: &str) {
    let graph = composed(name);

    assert_eq!(graph.of_kind("cluster").count(), 1);
    assert_eq!(graph.of_kind("task-definition").count(), 1);
    assert_eq!(graph.of_kind("service").count(), 1);
}

#[parameterized(
    batch_fetch = { "batch-fetch" },
    server = { "server" },
    server_ec2 = { "server-ec2" },
)]
fn service_references_declared_cluster_and_task(name: &str) {
    let graph = composed(name);
    let service = service_of(&graph);

    let cluster_id = &graph.of_kind("cluster").next().unwrap().id;
    let task_id = &graph.of_kind("task-definition").next().unwrap().id;
    assert_eq!(&service.cluster, cluster_id);
    assert_eq!(&service.task_definition, task_id);
    assert!(graph.validate().is_ok());
}

#[test]
fn batch_fetch_command_embeds_database_endpoint() {
    let graph = composed("batch-fetch");
    let task = graph.of_kind("task-definition").next().unwrap();
    let database_id = &graph.of_kind("database").next().unwrap().id;

    let command = match &task.spec {
        ResourceSpec::TaskDefinition(spec) => &spec.container.command,
        _ => unreachable!(),
    };

    let dbpath = command
        .iter()
        .find(|arg| arg.starts_with("-dbpath="))
        .expect("fetch command must carry -dbpath");
    assert!(dbpath.contains(database_id.as_str()));
    assert!(dbpath.ends_with(":5432/govaldb"));
    assert!(command.contains(&"-dbtype=postgres".to_string()));
}

#[test]
fn changing_database_identifier_renames_nothing_else() {
    let base = compose(
        &DeployEnv::default(),
        &DeploymentVariant::BatchFetch(BatchFetchConfig::default()),
    )
    .unwrap();

    let renamed = compose(
        &DeployEnv::default(),
        &DeploymentVariant::BatchFetch(BatchFetchConfig {
            db_identifier: "goval-dictionary-db-blue".to_string(),
            ..BatchFetchConfig::default()
        }),
    )
    .unwrap();

    let ids = |graph: &goval_stack::DeclarationGraph| -> Vec<LogicalId> {
        graph.resources().iter().map(|r| r.id.clone()).collect()
    };
    assert_eq!(ids(&base), ids(&renamed));
}

#[parameterized(
    server = { "server" },
    server_ec2 = { "server-ec2" },
)]
fn public_server_variants_front_a_public_load_balancer(name: &str) {
    let graph = composed(name);
    let service = service_of(&graph);

    let lb = service.load_balancer.as_ref().expect("server variants carry a load balancer");
    assert!(lb.public_facing);
    assert_eq!(lb.listener_port, 80);
}

#[test]
fn batch_fetch_has_no_public_load_balancer() {
    let graph = composed("batch-fetch");
    assert!(!service_of(&graph).is_public());
}

#[parameterized(
    server = { "server" },
    server_ec2 = { "server-ec2" },
)]
fn public_server_ingress_is_http_only(name: &str) {
    let graph = composed(name);
    let policy = graph.of_kind("access-policy").next().unwrap();

    let rules = match &policy.spec {
        ResourceSpec::AccessPolicy(spec) => &spec.rules,
        _ => unreachable!(),
    };

    let ingress: Vec<_> = rules
        .iter()
        .filter(|rule| rule.direction == Direction::Ingress)
        .collect();
    assert_eq!(ingress.len(), 1);
    assert_eq!(ingress[0].port, PortRange::single(80));
}

#[test]
fn host_capacity_bounds_are_exact() {
    let graph = composed("server-ec2");
    let cluster = graph.of_kind("cluster").next().unwrap();

    match &cluster.spec {
        ResourceSpec::Cluster(spec) => match &spec.compute {
            ComputeMode::HostCapacity { min, max, .. } => {
                assert_eq!(*min, 1);
                assert_eq!(*max, 1);
            }
            other => panic!("expected host capacity, got {:?}", other),
        },
        _ => unreachable!(),
    }
}

#[test]
fn host_capacity_task_runs_the_image_entrypoint() {
    let graph = composed("server-ec2");
    let task = graph.of_kind("task-definition").next().unwrap();

    match &task.spec {
        ResourceSpec::TaskDefinition(spec) => assert!(spec.container.command.is_empty()),
        _ => unreachable!(),
    }
}

#[test]
fn serverless_server_task_runs_the_server_command() {
    let graph = composed("server");
    let task = graph.of_kind("task-definition").next().unwrap();

    match &task.spec {
        ResourceSpec::TaskDefinition(spec) => {
            assert_eq!(spec.container.command[0], "server");
            assert!(spec.container.command.contains(&"-bind=0.0.0.0".to_string()));
        }
        _ => unreachable!(),
    }
}

#[parameterized(
    batch_fetch = { "batch-fetch" },
    server = { "server" },
    server_ec2 = { "server-ec2" },
)]
fn composition_is_deterministic(name: &str) {
    let env = DeployEnv::default()
        .with_account("123456789012")
        .with_region("ap-northeast-1");

    let first = compose(&env, &variant_by_name(name)).unwrap();
    let second = compose(&env, &variant_by_name(name)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn absent_account_and_region_compose_cleanly() {
    let env = DeployEnv {
        account: None,
        region: None,
    };

    for variant in DeploymentVariant::all_defaults() {
        let graph = compose(&env, &variant).unwrap();
        assert_eq!(graph.account(), None);
        assert_eq!(graph.region(), None);
    }
}

#[test]
fn injected_credentials_flow_into_the_database() {
    let credentials = Credentials {
        username: "govaladmin".to_string(),
        password: SecretRef::new("prod/goval/master"),
    };
    let graph = compose(
        &DeployEnv::default(),
        &DeploymentVariant::batch_fetch(credentials),
    )
    .unwrap();

    let database = graph.of_kind("database").next().unwrap();
    match &database.spec {
        ResourceSpec::Database(spec) => {
            assert_eq!(spec.credentials.username, "govaladmin");
            assert_eq!(spec.credentials.password.name(), "prod/goval/master");
        }
        _ => unreachable!(),
    }
}
