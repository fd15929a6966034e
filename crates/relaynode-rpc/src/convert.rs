//! Conversions between wire messages and registry types.

use relaynode_auth::{TrafficSnapshot, UserRecord};

use crate::proto::{User, UserList};

impl From<User> for UserRecord {
    /// Traffic fields are ignored; a mutation only carries identity and policy.
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            password: user.password,
            policy: user.policy.into_iter().collect(),
        }
    }
}

impl From<TrafficSnapshot> for User {
    fn from(snapshot: TrafficSnapshot) -> Self {
        Self {
            username: snapshot.username,
            traffic: snapshot.traffic,
            ip: snapshot.ip,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            ..Default::default()
        }
    }
}

impl FromIterator<TrafficSnapshot> for UserList {
    fn from_iter<I: IntoIterator<Item = TrafficSnapshot>>(iter: I) -> Self {
        Self {
            user_list: iter.into_iter().map(User::from).collect(),
        }
    }
}

/// Decode a pushed user list.
pub(crate) fn user_records(list: UserList) -> Vec<UserRecord> {
    list.user_list.into_iter().map(UserRecord::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_drops_traffic_fields() {
        let wire = User {
            username: "alice".into(),
            password: "p1".into(),
            traffic: 999,
            ip: "1.2.3.4".into(),
            created_at: 1,
            updated_at: 2,
            policy: [("tier".to_string(), "gold".to_string())].into(),
        };
        let record = UserRecord::from(wire);
        assert_eq!(record, UserRecord::new("alice", "p1").with_policy("tier", "gold"));
    }

    #[test]
    fn snapshot_rows_have_no_secret() {
        let list: UserList = vec![TrafficSnapshot {
            username: "dave".into(),
            traffic: 750,
            ip: "1.2.3.4".into(),
            created_at: 10,
            updated_at: 20,
        }]
        .into_iter()
        .collect();

        assert_eq!(list.user_list.len(), 1);
        let row = &list.user_list[0];
        assert_eq!(row.username, "dave");
        assert_eq!(row.traffic, 750);
        assert_eq!(row.ip, "1.2.3.4");
        assert_eq!((row.created_at, row.updated_at), (10, 20));
        assert!(row.password.is_empty());
        assert!(row.policy.is_empty());
    }
}
