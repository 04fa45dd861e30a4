//! # Route guard decisions
//!
//! Whether a protected view renders is a pure function of the session and role state:
//!
//! | session loading | principal | role loading | role matches | state |
//! |-----------------|-----------|--------------|--------------|-------|
//! | yes             | any       | any          | any          | [`GuardState::Loading`] |
//! | no              | absent    | any          | any          | [`GuardState::Redirect`] |
//! | no              | present   | yes          | any          | [`GuardState::Loading`] (role-scoped only) |
//! | no              | present   | no           | yes          | [`GuardState::Allowed`] |
//! | no              | present   | no           | no           | [`GuardState::Denied`] |
//!
//! Guards that only require a signed-in principal never look at the role.
//! `Redirect` means "no identity at all", `Denied` means "signed in, not privileged".

use std::fmt;

use crate::models::{Role, Session};
use crate::role::RoleStatus;

/// What a protected view asks of the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    Authenticated,
    Role(Role),
}

/// Render decision for one guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardState {
    Loading,
    Allowed,
    Denied,
    Redirect,
}

impl GuardState {
    /// Every state except `Loading` is final for a given set of inputs.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GuardState::Loading)
    }
}

impl fmt::Display for GuardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GuardState::Loading => "loading",
            GuardState::Allowed => "allowed",
            GuardState::Denied => "denied",
            GuardState::Redirect => "redirect",
        })
    }
}

/// Snapshot of everything a guard decision depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardInputs {
    pub session_loading: bool,
    pub principal_present: bool,
    pub role: RoleStatus,
}

impl GuardInputs {
    pub fn new(session: &Session, role: RoleStatus) -> Self {
        Self {
            session_loading: session.loading,
            principal_present: session.is_authenticated(),
            role,
        }
    }
}

impl Requirement {
    pub fn evaluate(self, inputs: GuardInputs) -> GuardState {
        if inputs.session_loading {
            return GuardState::Loading;
        }
        if !inputs.principal_present {
            return GuardState::Redirect;
        }
        match self {
            Requirement::Authenticated => GuardState::Allowed,
            Requirement::Role(_) if inputs.role.loading => GuardState::Loading,
            Requirement::Role(required) if inputs.role.role == required => GuardState::Allowed,
            Requirement::Role(_) => GuardState::Denied,
        }
    }
}

/// State history of one guard instance, with consecutive repeats collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardTrace {
    states: Vec<GuardState>,
}

impl GuardTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `requirement` against `inputs`, record the outcome and return it.
    pub fn observe(&mut self, requirement: Requirement, inputs: GuardInputs) -> GuardState {
        let state = requirement.evaluate(inputs);
        if self.states.last() != Some(&state) {
            self.states.push(state);
        }
        state
    }

    pub fn states(&self) -> &[GuardState] {
        &self.states
    }

    pub fn current(&self) -> Option<GuardState> {
        self.states.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(session_loading: bool, principal_present: bool, role: RoleStatus) -> GuardInputs {
        GuardInputs {
            session_loading,
            principal_present,
            role,
        }
    }

    #[test]
    fn test_anonymous_visitor_is_redirected_from_admin_view() {
        let admin = Requirement::Role(Role::Admin);
        let mut trace = GuardTrace::new();
        trace.observe(admin, inputs(true, false, RoleStatus::pending()));
        trace.observe(admin, inputs(false, false, RoleStatus::resolved(Role::User)));
        assert_eq!(trace.states(), &[GuardState::Loading, GuardState::Redirect]);
    }

    #[test]
    fn test_rider_is_denied_admin_view() {
        let admin = Requirement::Role(Role::Admin);
        let mut trace = GuardTrace::new();
        trace.observe(admin, inputs(true, false, RoleStatus::pending()));
        trace.observe(admin, inputs(false, true, RoleStatus::pending()));
        trace.observe(admin, inputs(false, true, RoleStatus::resolved(Role::Rider)));
        assert_eq!(trace.states(), &[GuardState::Loading, GuardState::Denied]);
    }

    #[test]
    fn test_admin_is_allowed_admin_view() {
        let admin = Requirement::Role(Role::Admin);
        let mut trace = GuardTrace::new();
        trace.observe(admin, inputs(true, false, RoleStatus::pending()));
        trace.observe(admin, inputs(false, true, RoleStatus::pending()));
        trace.observe(admin, inputs(false, true, RoleStatus::resolved(Role::Admin)));
        assert_eq!(trace.states(), &[GuardState::Loading, GuardState::Allowed]);
        assert_eq!(trace.current(), Some(GuardState::Allowed));
    }

    #[test]
    fn test_private_guard_ignores_role() {
        let private = Requirement::Authenticated;
        assert_eq!(
            private.evaluate(inputs(false, true, RoleStatus::pending())),
            GuardState::Allowed
        );
        assert_eq!(
            private.evaluate(inputs(false, false, RoleStatus::pending())),
            GuardState::Redirect
        );
        assert_eq!(
            private.evaluate(inputs(true, true, RoleStatus::resolved(Role::Admin))),
            GuardState::Loading
        );
    }

    #[test]
    fn test_decision_is_pure() {
        let statuses = [
            RoleStatus::pending(),
            RoleStatus::resolved(Role::User),
            RoleStatus::resolved(Role::Rider),
            RoleStatus::resolved(Role::Admin),
        ];
        let requirements = [
            Requirement::Authenticated,
            Requirement::Role(Role::Admin),
            Requirement::Role(Role::Rider),
        ];
        for requirement in requirements {
            for session_loading in [true, false] {
                for principal_present in [true, false] {
                    for role in statuses {
                        let input = inputs(session_loading, principal_present, role);
                        let first = requirement.evaluate(input);
                        assert_eq!(first, requirement.evaluate(input));
                        if session_loading {
                            assert_eq!(first, GuardState::Loading);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_inputs_from_session() {
        let session = Session::default();
        let input = GuardInputs::new(&session, RoleStatus::pending());
        assert!(input.session_loading);
        assert!(!input.principal_present);
        assert!(!GuardState::Loading.is_terminal());
        assert!(GuardState::Denied.is_terminal());
    }
}
