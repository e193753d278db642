//! # Edit Payload Validation
//!
//! [`Validate`] implementations for the domain types a user can edit:
//! rule sets, listeners, routes, backends and targets. Nested failures are
//! reported under the top-level field with the path of the offending element
//! in the message (for example `invalid_claim_key at rules[1].key`).

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::{
    Backend, BackendTarget, Listener, PathMatch, Route, RuleSet, StringMatch, Target, TargetSpec,
};
use crate::validation::{
    validate_claim_key, validate_host_port, validate_hostname, validate_http_method,
    validate_listener_name, validate_path, validate_policy_name, validate_regex_pattern,
    validate_route_name, validate_service_name,
};

fn located(error: ValidationError, location: &str) -> ValidationError {
    let message = format!("{} at {}", error.code, location);
    error.with_message(Cow::Owned(message))
}

fn check(
    errors: &mut ValidationErrors,
    field: &'static str,
    location: &str,
    result: std::result::Result<(), ValidationError>,
) {
    if let Err(error) = result {
        errors.add(field, located(error, location));
    }
}

fn require(errors: &mut ValidationErrors, field: &'static str, location: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, located(ValidationError::new("required"), location));
    }
}

fn finish(errors: ValidationErrors) -> std::result::Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_rule_set(
    rule_set: &RuleSet,
    at: &str,
    name_field: &'static str,
    rules_field: &'static str,
    errors: &mut ValidationErrors,
) {
    check(errors, name_field, &format!("{}name", at), validate_policy_name(&rule_set.name));
    for (i, rule) in rule_set.rules.iter().enumerate() {
        let rule_at = format!("{}rules[{}]", at, i);
        check(errors, rules_field, &format!("{}.key", rule_at), validate_claim_key(&rule.key));
        require(errors, rules_field, &format!("{}.value", rule_at), &rule.value);
        require(errors, rules_field, &format!("{}.resource.id", rule_at), &rule.resource.id);
    }
}

fn check_backend(backend: &Backend, at: &str, field: &'static str, errors: &mut ValidationErrors) {
    match &backend.target {
        BackendTarget::Host(host) => check(errors, field, at, validate_host_port(host)),
        BackendTarget::Service(service) => {
            check(errors, field, at, validate_service_name(&service.name));
            if service.port == 0 {
                errors.add(field, located(ValidationError::new("invalid_port"), at));
            }
        }
        BackendTarget::Ai(ai) if ai.provider.len() != 1 => {
            errors.add(field, located(ValidationError::new("ai_provider_required"), at));
        }
        BackendTarget::Mcp(mcp) => {
            for (i, target) in mcp.targets.iter().enumerate() {
                check_target(target, &format!("{}.mcp.targets[{}]", at, i), field, errors);
            }
        }
        BackendTarget::Unknown => {
            errors.add(field, located(ValidationError::new("unknown_backend_kind"), at));
        }
        BackendTarget::Ai(_) | BackendTarget::Dynamic => {}
    }
    if backend.weight == Some(0) {
        errors.add(field, located(ValidationError::new("weight_must_be_positive"), at));
    }
}

fn check_route(route: &Route, at: &str, field: &'static str, errors: &mut ValidationErrors) {
    if let Some(name) = &route.name {
        check(errors, field, &format!("{}name", at), validate_route_name(name));
    }
    for (i, hostname) in route.hostnames.iter().enumerate() {
        check(errors, field, &format!("{}hostnames[{}]", at, i), validate_hostname(hostname));
    }
    for (i, route_match) in route.matches.iter().enumerate() {
        let match_at = format!("{}matches[{}]", at, i);
        let path_result = match &route_match.path {
            PathMatch::Exact(path) | PathMatch::PathPrefix(path) => validate_path(path),
            PathMatch::Regex(pattern) => validate_regex_pattern(pattern),
        };
        check(errors, field, &format!("{}.path", match_at), path_result);
        if let Some(method) = &route_match.method {
            check(errors, field, &format!("{}.method", match_at), validate_http_method(method));
        }
        for header in &route_match.headers {
            if let StringMatch::Regex(pattern) = &header.value {
                check(
                    errors,
                    field,
                    &format!("{}.headers.{}", match_at, header.name),
                    validate_regex_pattern(pattern),
                );
            }
        }
    }
    for (i, backend) in route.backends.iter().enumerate() {
        check_backend(backend, &format!("{}backends[{}]", at, i), field, errors);
    }
}

fn check_target(target: &Target, at: &str, field: &'static str, errors: &mut ValidationErrors) {
    require(errors, field, &format!("{}.name", at), &target.name);
    match &target.spec {
        TargetSpec::Stdio(stdio) => {
            require(errors, field, &format!("{}.stdio.cmd", at), &stdio.cmd)
        }
        TargetSpec::Sse(sse) => {
            require(errors, field, &format!("{}.sse.host", at), &sse.host);
            if sse.port == 0 {
                errors.add(field, located(ValidationError::new("invalid_port"), at));
            }
        }
        TargetSpec::OpenApi(openapi) => {
            require(errors, field, &format!("{}.openapi.host", at), &openapi.host);
            if openapi.port == 0 {
                errors.add(field, located(ValidationError::new("invalid_port"), at));
            }
        }
        TargetSpec::Unknown => {
            errors.add(field, located(ValidationError::new("unknown_target_kind"), at));
        }
    }
}

impl Validate for RuleSet {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_rule_set(self, "", "name", "rules", &mut errors);
        finish(errors)
    }
}

impl Validate for Backend {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_backend(self, "backend", "backend", &mut errors);
        finish(errors)
    }
}

impl Validate for Route {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_route(self, "", "route", &mut errors);
        finish(errors)
    }
}

impl Validate for Target {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_target(self, "target", "target", &mut errors);
        finish(errors)
    }
}

impl Validate for Listener {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match &self.name {
            Some(name) => check(&mut errors, "name", "name", validate_listener_name(name)),
            None => errors.add("name", located(ValidationError::new("required"), "name")),
        }
        if let Some(hostname) = &self.hostname {
            check(&mut errors, "hostname", "hostname", validate_hostname(hostname));
        }
        if let Some(tls) = &self.tls {
            require(&mut errors, "tls", "tls.cert", &tls.cert);
            require(&mut errors, "tls", "tls.key", &tls.key);
        }
        for (i, rule_set) in self.policies().iter().enumerate() {
            check_rule_set(rule_set, &format!("sse.rbac[{}].", i), "sse", "sse", &mut errors);
        }
        for (i, route) in self.http_routes().iter().enumerate() {
            check_route(route, &format!("routes[{}].", i), "routes", &mut errors);
        }
        for (i, route) in self.tcp_routes().iter().enumerate() {
            for (j, backend) in route.backends.iter().enumerate() {
                check_backend(
                    backend,
                    &format!("tcpRoutes[{}].backends[{}]", i, j),
                    "tcpRoutes",
                    &mut errors,
                );
            }
        }
        finish(errors)
    }
}
