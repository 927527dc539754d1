//! Named authorization policies.
//!
//! A policy is satisfied when the caller holds at least one of its roles.

pub const USER_ROLE: &str = "User";
pub const ADMIN_ROLE: &str = "Admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub name: &'static str,
    pub roles: &'static [&'static str],
}

pub const USER_POLICY: Policy = Policy {
    name: "UserPolicy",
    roles: &[USER_ROLE, ADMIN_ROLE],
};

pub const ADMIN_POLICY: Policy = Policy {
    name: "AdminPolicy",
    roles: &[ADMIN_ROLE],
};

const POLICIES: [Policy; 2] = [USER_POLICY, ADMIN_POLICY];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// No identity on the request.
    Unauthenticated,
    /// Identity present, no accepted role.
    Forbidden,
}

impl Policy {
    pub fn by_name(name: &str) -> Option<Policy> {
        POLICIES.into_iter().find(|p| p.name == name)
    }

    /// `held` is `None` for anonymous requests.
    pub fn evaluate<S: AsRef<str>>(&self, held: Option<&[S]>) -> Decision {
        match held {
            None => Decision::Unauthenticated,
            Some(roles) if roles.iter().any(|r| self.roles.contains(&r.as_ref())) => {
                Decision::Allow
            }
            Some(_) => Decision::Forbidden,
        }
    }
}
