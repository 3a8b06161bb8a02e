//! Service operations as seen by error reporting.
//!
//! Every failing request is attributed to the operation it was performing.
//! The operation decides the short message returned to clients and the
//! label used in failure metrics.

/// One of the public service operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `POST /api/users`
    CreateUser,
    /// `GET /api/users`
    ListUsers,
    /// `POST /api/users/{id}/exercises`
    AddExercise,
    /// `GET /api/users/{id}/logs`
    GetLogs,
}

impl Operation {
    /// Stable identifier used in logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateUser => "create_user",
            Self::ListUsers => "list_users",
            Self::AddExercise => "add_exercise",
            Self::GetLogs => "get_logs",
        }
    }

    /// Message returned in the `error` field of a failed response.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::CreateUser => "Unable to create user",
            Self::ListUsers => "Unable to list users",
            Self::AddExercise => "Unable to add exercise",
            Self::GetLogs => "Unable to fetch logs",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
