// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const REVIEW_GATE: &str = r#"
name: review-loop
agents:
  - profile: implementer
    role: author
  - profile: reviewer
    role: reviewer
    count: 2
coordination: review-gate
flow:
  initial: draft
  stages: [draft, review, done]
  transitions:
    - from: draft
      to: review
      trigger: author_done
    - from: review
      to: done
      trigger: approved
  require_approval: true
  approval_mode: quorum
  quorum: 2
prompts:
  - "Implement the change."
  - "Review the diff."
error_handling:
  on_agent_crash: restart
  on_timeout: fail
  stage_timeout_minutes: 20
"#;

#[test]
fn full_template_parses() {
    let template = WorkflowTemplate::from_yaml(REVIEW_GATE).unwrap();
    assert_eq!(template.name, "review-loop");
    assert_eq!(template.agents.len(), 2);
    assert_eq!(template.agents[0].count, 1);
    assert_eq!(template.agents[1].count, 2);
    assert_eq!(template.coordination, Coordination::ReviewGate);
    assert_eq!(template.flow.approval_mode, ApprovalMode::Quorum);
    assert_eq!(template.flow.quorum, 2);
    assert_eq!(template.error_handling.stage_timeout_minutes, 20);
    // Unspecified error handling falls back to defaults
    assert_eq!(template.error_handling.on_agent_error, "retry");
    assert_eq!(template.error_handling.max_retries_per_stage, 2);
}

#[yare::parameterized(
    simple    = { "review", true },
    dashed    = { "ping-pong_2", true },
    uppercase = { "Review", false },
    leading_digit = { "2review", false },
    empty     = { "", false },
    dotted    = { "a.b", false },
)]
fn name_rules(name: &str, ok: bool) {
    let mut template = WorkflowTemplate::from_yaml(REVIEW_GATE).unwrap();
    template.name = name.to_string();
    assert_eq!(template.validate().is_empty(), ok);
}

#[test]
fn validation_collects_every_issue() {
    let mut template = WorkflowTemplate::from_yaml(REVIEW_GATE).unwrap();
    template.name = "Bad Name".to_string();
    template.agents[0].profile = String::new();
    template.flow.quorum = 0;
    template.flow.transitions[0].to = "missing-stage".to_string();
    template.flow.transitions[1].trigger = String::new();

    let errors = template.validate();
    let fields: Vec<&str> = errors.issues.iter().map(|i| i.field.as_str()).collect();
    assert_eq!(
        fields,
        vec![
            "name",
            "agents[0].profile",
            "flow.quorum",
            "flow.transitions[0].to",
            "flow.transitions[1].trigger",
        ]
    );
}

#[test]
fn initial_must_be_a_declared_stage() {
    let mut template = WorkflowTemplate::from_yaml(REVIEW_GATE).unwrap();
    template.flow.initial = Some("warmup".to_string());
    assert!(!template.validate().is_empty());
}

#[test]
fn quorum_only_matters_in_quorum_mode() {
    let mut template = WorkflowTemplate::from_yaml(REVIEW_GATE).unwrap();
    template.flow.approval_mode = ApprovalMode::All;
    template.flow.quorum = 0;
    assert!(template.validate().is_empty());
}

#[test]
fn unknown_coordination_fails_to_parse() {
    let yaml = REVIEW_GATE.replace("review-gate", "free-for-all");
    assert!(matches!(
        WorkflowTemplate::from_yaml(&yaml),
        Err(TemplateError::Parse(_))
    ));
}
