use std::collections::HashMap;

use serde::Serialize;

/// Committee roles recognized in intros and cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    ViceChair,
    RankingMember,
    Chair,
}

impl Role {
    /// Classify a raw role token. A token mentioning VICE wins over RANKING,
    /// which wins over a plain CHAIR.
    pub fn classify(raw: &str) -> Self {
        let upper = raw.to_uppercase();
        if upper.contains("VICE") {
            Role::ViceChair
        } else if upper.contains("RANKING") {
            Role::RankingMember
        } else {
            Role::Chair
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::ViceChair => "VICE CHAIR",
            Role::RankingMember => "RANKING MEMBER",
            Role::Chair => "CHAIR",
        }
    }
}

/// A detected speaker-turn boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// Byte offset where the match begins (including any leading whitespace or bullet)
    pub start: usize,
    /// Byte offset just past the terminating punctuation and whitespace
    pub end: usize,
    /// The speaker label as matched, e.g. "Mr. SMITH of Texas"
    pub text: String,
    /// Upper-cased surname token, e.g. "SMITH"
    pub surname: String,
    /// Whether the label carried a personal name rather than only a role
    pub named: bool,
    /// Whether the label passes the narrow chair prefix test
    pub is_chair: bool,
    pub role: Option<Role>,
}

/// Role -> surname, derived from the intro window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleBindings {
    bindings: HashMap<Role, String>,
}

impl RoleBindings {
    /// Bind a role; a later binding of the same role replaces the earlier one
    pub fn bind(&mut self, role: Role, surname: impl Into<String>) {
        self.bindings.insert(role, surname.into());
    }

    pub fn get(&self, role: Role) -> Option<&str> {
        self.bindings.get(&role).map(String::as_str)
    }

    /// Bindings sorted by role for stable reporting
    pub fn sorted(&self) -> Vec<(Role, &str)> {
        let mut out: Vec<(Role, &str)> =
            self.bindings.iter().map(|(r, s)| (*r, s.as_str())).collect();
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_classify_priority() {
        assert_eq!(Role::classify("VICE CHAIRMAN"), Role::ViceChair);
        assert_eq!(Role::classify("Ranking Member"), Role::RankingMember);
        assert_eq!(Role::classify("chairwoman"), Role::Chair);
    }

    #[test]
    fn test_later_binding_overwrites() {
        let mut roles = RoleBindings::default();
        roles.bind(Role::Chair, "SMITH");
        roles.bind(Role::Chair, "JONES");
        roles.bind(Role::RankingMember, "BROWN");

        assert_eq!(roles.get(Role::Chair), Some("JONES"));
        assert_eq!(
            roles.sorted(),
            vec![(Role::RankingMember, "BROWN"), (Role::Chair, "JONES")]
        );
    }
}
