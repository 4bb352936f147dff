use serde::Serialize;

/// Action a caller may attempt; the unit of authorization.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreateSoftware,
    ViewSoftware,
    CreateRequest,
    ListOwnRequests,
    ListPendingRequests,
    DecideRequest,
    ViewDashboard,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::CreateSoftware,
        Action::ViewSoftware,
        Action::CreateRequest,
        Action::ListOwnRequests,
        Action::ListPendingRequests,
        Action::DecideRequest,
        Action::ViewDashboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CreateSoftware => "software.create",
            Action::ViewSoftware => "software.read",
            Action::CreateRequest => "requests.create",
            Action::ListOwnRequests => "requests.read_own",
            Action::ListPendingRequests => "requests.read_pending",
            Action::DecideRequest => "requests.decide",
            Action::ViewDashboard => "dashboard.read",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
