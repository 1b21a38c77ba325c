//! The `classify` subcommand.

use kfcreds_common::{credentials::InjectionReport, prelude::*};

use super::SourceOpt;
use crate::description::render_description;

/// Template for human-readable `classify` output.
const CLASSIFY_TEMPLATE: &str = include_str!("classify.txt.hbs");

/// The `classify` subcommand.
pub fn run(source: &SourceOpt) -> Result<()> {
    let builder = source.credential_builder()?;
    let service_account = source.service_account.as_deref().unwrap_or("");
    let report = builder.classify_service_account(&source.namespace, service_account);
    print!("{}", render_report(&report)?);
    Ok(())
}

fn render_report(report: &InjectionReport) -> Result<String> {
    render_description(CLASSIFY_TEMPLATE, report)
}

#[test]
fn render_template() {
    use kfcreds_common::credentials::{HdfsRole, Provider, SecretClassification};

    let report = InjectionReport {
        namespace: "kubeflow".to_owned(),
        service_account: "default".to_owned(),
        service_account_missing: false,
        secrets: vec![
            SecretClassification {
                secret: "hdfs-token".to_owned(),
                provider: Some(Provider::Hdfs(HdfsRole::Token)),
            },
            SecretClassification {
                secret: "default-token-abcde".to_owned(),
                provider: None,
            },
        ],
        unavailable_secrets: vec!["gone".to_owned()],
    };
    let rendered = render_report(&report).expect("could not render template");
    assert!(rendered.contains("hdfs-token: hdfs token"));
    assert!(rendered.contains("default-token-abcde: (none)"));
    assert!(rendered.contains("gone"));

    let missing = InjectionReport {
        service_account_missing: true,
        ..report
    };
    let rendered = render_report(&missing).expect("could not render template");
    assert!(rendered.contains("not found"));
}
