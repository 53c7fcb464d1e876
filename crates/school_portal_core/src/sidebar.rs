//! crates/school_portal_core/src/sidebar.rs
//!
//! The sidebar controller: validates the session on mount, keeps two live
//! subscriptions open for the viewer, and renders the derived navigation.

use futures::StreamExt;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{LiveQuery, Record, SessionInfo, Snapshot};
use crate::navigation::{
    build_navigation, render, NavItem, NavigationInputs, RenderedSidebar, Section,
    SidebarCapabilities,
};
use crate::ports::{LiveQueryService, PortResult, SessionApi};
use crate::subscription::{SnapshotStream, SubscriptionHandle};

/// The result of mounting a sidebar.
pub enum MountOutcome {
    Mounted(MountedSidebar),
    /// The viewer may not see this sidebar; navigate to the given route instead.
    Redirect(String),
}

impl std::fmt::Debug for MountOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MountOutcome::Mounted(s) => write!(f, "Mounted({})", s.session.email),
            MountOutcome::Redirect(route) => write!(f, "Redirect({})", route),
        }
    }
}

/// Live inputs plus which of them have been delivered at least once.
#[derive(Debug, Clone, Default)]
struct LiveState {
    inputs: NavigationInputs,
    hod_loaded: bool,
    grades_loaded: bool,
}

pub struct Sidebar;

impl Sidebar {
    pub async fn mount(
        caps: SidebarCapabilities,
        session_api: Arc<dyn SessionApi>,
        live: Arc<dyn LiveQueryService>,
    ) -> MountOutcome {
        // 1. Validate the session
        let session = match session_api.validate().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Session validation failed, redirecting: {}", e);
                return MountOutcome::Redirect(caps.login_route.clone());
            }
        };
        if session.role != caps.expected_role {
            warn!(
                "Session role {} does not match sidebar role {}, redirecting.",
                session.role, caps.expected_role
            );
            return MountOutcome::Redirect(caps.login_route.clone());
        }

        let wants_hod = caps.sections.contains(&Section::HeadOfDepartment);
        let wants_grades = caps.sections.contains(&Section::AdvisorClasses);

        // 2. Open the live subscriptions keyed by the viewer's email, concurrently
        let (hod, grades) = tokio::join!(
            open(
                &*live,
                wants_hod,
                LiveQuery::departments_headed_by(&session.email)
            ),
            open(
                &*live,
                wants_grades,
                LiveQuery::grades_advised_by(&session.email)
            ),
        );
        let (hod, grades) = match (hod, grades) {
            (Ok(hod), Ok(grades)) => (hod, grades),
            // Whichever side did open is dropped with the tuple, which releases it.
            (Err(e), _) | (_, Err(e)) => {
                warn!("Live subscription failed, redirecting: {}", e);
                return MountOutcome::Redirect(caps.login_route.clone());
            }
        };

        // 3. Feed each subscription into the shared state independently
        let (state, _) = watch::channel(LiveState {
            hod_loaded: !wants_hod,
            grades_loaded: !wants_grades,
            ..LiveState::default()
        });
        let state = Arc::new(state);
        let mut handles = Vec::new();
        let mut tasks = Vec::new();

        if let Some((handle, snapshots)) = hod {
            handles.push(handle);
            tasks.push(spawn_feed(snapshots, state.clone(), apply_departments));
        }
        if let Some((handle, snapshots)) = grades {
            handles.push(handle);
            tasks.push(spawn_feed(snapshots, state.clone(), apply_grades));
        }

        info!(
            "Sidebar mounted for {} with {} live subscription(s).",
            session.email,
            handles.len()
        );
        MountOutcome::Mounted(MountedSidebar {
            caps,
            session,
            session_api,
            state,
            collapsed: AtomicBool::new(false),
            handles,
            tasks,
            released: AtomicBool::new(false),
        })
    }
}

async fn open(
    live: &dyn LiveQueryService,
    wanted: bool,
    query: LiveQuery,
) -> PortResult<Option<(SubscriptionHandle, SnapshotStream)>> {
    if !wanted {
        return Ok(None);
    }
    Ok(Some(live.watch(query).await?.into_parts()))
}

fn spawn_feed(
    mut snapshots: SnapshotStream,
    state: Arc<watch::Sender<LiveState>>,
    apply: fn(&mut LiveState, Snapshot),
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(snapshot) = snapshots.next().await {
            state.send_modify(|s| apply(s, snapshot));
        }
        debug!("Sidebar feed ended.");
    })
}

fn apply_departments(state: &mut LiveState, snapshot: Snapshot) {
    state.inputs.is_hod = !snapshot.is_empty();
    state.hod_loaded = true;
}

fn apply_grades(state: &mut LiveState, snapshot: Snapshot) {
    state.inputs.advisor_grades = snapshot.iter().filter_map(grade_key).collect::<BTreeSet<_>>();
    state.grades_loaded = true;
}

/// The grade a record stands for. Numeric grades are kept as their decimal text.
fn grade_key(record: &Record) -> Option<String> {
    match record.fields.get("grade") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        other => {
            debug!("Skipping grade record {} with grade {:?}.", record.id, other);
            None
        }
    }
}

/// A sidebar that passed validation and holds live subscriptions until unmounted.
pub struct MountedSidebar {
    caps: SidebarCapabilities,
    session: SessionInfo,
    session_api: Arc<dyn SessionApi>,
    state: Arc<watch::Sender<LiveState>>,
    collapsed: AtomicBool,
    handles: Vec<SubscriptionHandle>,
    tasks: Vec<JoinHandle<()>>,
    released: AtomicBool,
}

impl MountedSidebar {
    pub fn session(&self) -> &SessionInfo {
        &self.session
    }

    pub fn inputs(&self) -> NavigationInputs {
        self.state.borrow().inputs.clone()
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed.load(Ordering::SeqCst)
    }

    /// Flips the collapsed flag and returns the new value.
    pub fn toggle_collapsed(&self) -> bool {
        !self.collapsed.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn set_collapsed(&self, collapsed: bool) {
        self.collapsed.store(collapsed, Ordering::SeqCst);
    }

    pub fn items(&self) -> Vec<NavItem> {
        build_navigation(&self.caps, &self.state.borrow().inputs)
    }

    pub fn render(&self) -> RenderedSidebar {
        render(&self.items(), self.is_collapsed())
    }

    /// Waits until every open subscription has delivered its first snapshot.
    /// Returns `false` when the timeout elapses first.
    pub async fn wait_ready(&self, timeout: Duration) -> bool {
        let mut rx = self.state.subscribe();
        let ready = async move {
            rx.wait_for(|s| s.hod_loaded && s.grades_loaded)
                .await
                .is_ok()
        };
        tokio::time::timeout(timeout, ready).await.unwrap_or(false)
    }

    /// Releases both subscriptions. Only the first call does anything.
    pub fn unmount(&self) -> bool {
        if self.released.swap(true, Ordering::SeqCst) {
            return false;
        }
        for handle in &self.handles {
            handle.unsubscribe();
        }
        for task in &self.tasks {
            task.abort();
        }
        debug!("Sidebar for {} unmounted.", self.session.email);
        true
    }

    pub fn is_unmounted(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Ends the session and returns the route to navigate to. A failed logout is
    /// only logged; the viewer is redirected either way.
    pub async fn logout(&self) -> String {
        if let Err(e) = self.session_api.logout().await {
            warn!("Logout failed for {}: {}", self.session.email, e);
        }
        self.unmount();
        self.caps.login_route.clone()
    }
}

impl Drop for MountedSidebar {
    fn drop(&mut self) {
        self.unmount();
    }
}
