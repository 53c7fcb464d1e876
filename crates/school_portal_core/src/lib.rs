pub mod domain;
pub mod memory;
pub mod navigation;
pub mod password_policy;
pub mod ports;
pub mod sidebar;
pub mod subscription;

pub use domain::{AuthenticatedUser, LiveQuery, Record, Role, SessionInfo, Snapshot};
pub use navigation::{NavItem, NavigationInputs, RenderedSidebar, SidebarCapabilities};
pub use password_policy::{validate_password, PolicyViolation};
pub use ports::{IdentityProvider, LiveQueryService, PortError, PortResult, SessionApi, SignInError};
pub use sidebar::{MountOutcome, MountedSidebar, Sidebar};
pub use subscription::{Subscription, SubscriptionHandle};
