//! The `inject` subcommand.

use kfcreds_common::{
    credentials::DEFAULT_SERVICE_ACCOUNT_NAME,
    k8s::{Container, PodSpec},
    prelude::*,
};
use std::path::Path;

use super::SourceOpt;
use crate::inputs::read_yaml_or_json;

/// The `inject` subcommand.
pub fn run(source: &SourceOpt, container_name: Option<&str>, pod_spec: &Path) -> Result<()> {
    let mut pod: PodSpec = read_yaml_or_json(pod_spec)?;
    let service_account = service_account_for(source, &pod);

    let builder = source.credential_builder()?;
    let PodSpec {
        containers,
        volumes,
        ..
    } = &mut pod;
    let container = target_container(containers, container_name)?;
    let report = builder.inject(&source.namespace, &service_account, container, volumes)?;
    if report.service_account_missing {
        warn!(
            "service account {}/{} not found, leaving pod unchanged",
            report.namespace, report.service_account,
        );
    }

    print!(
        "{}",
        serde_yaml::to_string(&pod).context("could not serialize pod spec")?
    );
    Ok(())
}

/// Pick a service account: `--service-account`, then the pod's own service
/// account, then `default`.
fn service_account_for(source: &SourceOpt, pod: &PodSpec) -> String {
    source
        .service_account
        .clone()
        .or_else(|| pod.service_account_name.clone())
        .unwrap_or_else(|| DEFAULT_SERVICE_ACCOUNT_NAME.to_owned())
}

/// Find the container named `name`, or the first container if no name was
/// given.
fn target_container<'a>(
    containers: &'a mut [Container],
    name: Option<&str>,
) -> Result<&'a mut Container> {
    match name {
        Some(name) => containers
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| format_err!("no container named {:?} in pod spec", name)),
        None => containers
            .first_mut()
            .ok_or_else(|| format_err!("pod spec has no containers")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(service_account: Option<&str>) -> SourceOpt {
        SourceOpt {
            namespace: "ns".to_owned(),
            service_account: service_account.map(|s| s.to_owned()),
            config: None,
            objects: None,
        }
    }

    fn pod(service_account: Option<&str>, containers: &[&str]) -> PodSpec {
        PodSpec {
            service_account_name: service_account.map(|s| s.to_owned()),
            containers: containers
                .iter()
                .map(|name| Container {
                    name: (*name).to_owned(),
                    ..Container::default()
                })
                .collect(),
            ..PodSpec::default()
        }
    }

    #[test]
    fn service_account_from_command_line_wins() {
        let pod = pod(Some("podsa"), &["a"]);
        assert_eq!(service_account_for(&source(Some("cli")), &pod), "cli");
    }

    #[test]
    fn service_account_falls_back_to_pod() {
        let pod = pod(Some("podsa"), &["a"]);
        assert_eq!(service_account_for(&source(None), &pod), "podsa");
    }

    #[test]
    fn service_account_falls_back_to_default() {
        let pod = pod(None, &["a"]);
        assert_eq!(service_account_for(&source(None), &pod), "default");
    }

    #[test]
    fn first_container_by_default() {
        let mut pod = pod(None, &["a", "b"]);
        let container = target_container(&mut pod.containers, None).unwrap();
        assert_eq!(container.name, "a");
    }

    #[test]
    fn named_container() {
        let mut pod = pod(None, &["a", "b"]);
        let container = target_container(&mut pod.containers, Some("b")).unwrap();
        assert_eq!(container.name, "b");
    }

    #[test]
    fn unknown_container_is_an_error() {
        let mut pod = pod(None, &["a", "b"]);
        let err = target_container(&mut pod.containers, Some("c")).unwrap_err();
        assert!(err.to_string().contains("no container named \"c\""));
    }

    #[test]
    fn pod_without_containers_is_an_error() {
        let mut pod = pod(None, &[]);
        let err = target_container(&mut pod.containers, None).unwrap_err();
        assert!(err.to_string().contains("no containers"));
    }
}
