//! Live views over Server-Sent Events.
//!
//! Each endpoint watches a collection on the change feed and sends the
//! re-rendered fragment whenever it changes. Pages connect with the htmx
//! `sse` extension and swap the event into place.
//!
//! Every stream also follows the viewer's admin flag. Once it is revoked
//! the stream sends a final `revoked` event and ends; the page reacts by
//! re-requesting `/`, which signs the viewer out.

use std::convert::Infallible;
use std::future::Future;

use askama::Template;
use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::{Stream, StreamExt, stream};

use afrah_core::UserId;
use afrah_store::live::{Collection, Snapshot, Subscription, watch_collection, watch_document};
use afrah_store::rules::{Actor, DocPath, Operation};
use afrah_store::{AdminRepository, ErrorBus};

use crate::error::Result;
use crate::fragments::{
    Dashboard, DashboardFragment, MessagesFragment, OrdersFragment, UsersFragment, load_messages,
    load_orders, load_users,
};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Event sent just before a stream closes on revocation.
pub const REVOKED_EVENT: &str = "revoked";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/live/dashboard", get(dashboard))
        .route("/live/orders", get(orders))
        .route("/live/users", get(users))
        .route("/live/messages", get(messages))
}

/// Render one snapshot as a named event.
///
/// Snapshots without data (still loading, or failed before the first
/// load) are skipped; the page already shows the server-rendered table.
fn to_event<T, R>(name: &'static str, snapshot: Snapshot<T>, render: &R) -> Option<Event>
where
    R: Fn(T, Option<String>) -> askama::Result<String>,
{
    let data = snapshot.data?;
    match render(data, snapshot.error) {
        Ok(html) => Some(Event::default().event(name).data(html)),
        Err(e) => {
            tracing::error!(event = name, error = %e, "failed to render live fragment");
            None
        }
    }
}

/// Who is watching, and what they were allowed to read.
#[derive(Debug, Clone)]
struct Viewer {
    id: UserId,
    path: DocPath,
    errors: ErrorBus,
}

impl Viewer {
    fn new(state: &AppState, id: UserId, path: DocPath) -> Self {
        Self {
            id,
            path,
            errors: state.errors().clone(),
        }
    }

    /// Re-check the read as a plain user, reporting the denial on the bus,
    /// and build the closing event.
    fn revoke(&self) -> Event {
        if let Err(error) = self
            .errors
            .check(&Actor::User(self.id), &self.path, Operation::List, None)
        {
            tracing::warn!(user_id = %self.id, error = %error, "admin access revoked, closing live view");
        }
        Event::default().event(REVOKED_EVENT).data(REVOKED_EVENT)
    }
}

enum Frame<T> {
    Data(Snapshot<T>),
    Access(Snapshot<bool>),
}

/// Follow the viewer's admin flag.
fn watch_access(state: &AppState, id: UserId) -> Subscription<bool> {
    let pool = state.pool().clone();
    watch_document(state.feed(), Collection::Admins, id, move || {
        let pool = pool.clone();
        async move { AdminRepository::new(&pool).is_admin(id).await }
    })
}

/// Rendered fragments until `access` reports the flag gone, then one
/// [`REVOKED_EVENT`].
fn admin_events<T, S, R>(
    name: &'static str,
    viewer: Viewer,
    access: Subscription<bool>,
    snapshots: S,
    render: R,
) -> impl Stream<Item = Event>
where
    T: Send + 'static,
    S: Stream<Item = Snapshot<T>> + Send + 'static,
    R: Fn(T, Option<String>) -> askama::Result<String> + Send + 'static,
{
    let frames = Box::pin(stream::select(
        snapshots.map(Frame::Data),
        access.into_stream().map(Frame::Access),
    ));
    stream::unfold(Some((frames, viewer, render)), move |state| async move {
        let Some((mut frames, viewer, render)) = state else {
            return None;
        };
        while let Some(frame) = frames.next().await {
            match frame {
                Frame::Data(snapshot) => {
                    if let Some(event) = to_event(name, snapshot, &render) {
                        return Some((event, Some((frames, viewer, render))));
                    }
                }
                Frame::Access(snapshot) if snapshot.data == Some(false) => {
                    return Some((viewer.revoke(), None));
                }
                Frame::Access(_) => {}
            }
        }
        None
    })
}

fn live<T, S, R>(
    state: &AppState,
    name: &'static str,
    viewer: Viewer,
    snapshots: S,
    render: R,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>> + use<T, S, R>>
where
    T: Send + 'static,
    S: Stream<Item = Snapshot<T>> + Send + 'static,
    R: Fn(T, Option<String>) -> askama::Result<String> + Send + 'static,
{
    let access = watch_access(state, viewer.id);
    let events = admin_events(name, viewer, access, snapshots, render).map(Ok);
    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Watch `collection`, reloading with `load` against the pool.
fn watch<T, F, Fut>(state: &AppState, collection: Collection, load: F) -> Subscription<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(sqlx::PgPool) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<T, afrah_store::RepositoryError>> + Send,
{
    let pool = state.pool().clone();
    watch_collection(state.feed(), collection, move || load(pool.clone()))
}

/// `GET /live/dashboard` - follows the orders collection.
async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    state
        .errors()
        .check(&admin.actor(), &DocPath::Orders, Operation::List, None)?;
    let subscription = watch(&state, Collection::Orders, |pool| async move {
        Dashboard::load(&pool).await
    });
    let viewer = Viewer::new(&state, admin.id, DocPath::Orders);
    Ok(live(
        &state,
        "dashboard",
        viewer,
        subscription.into_stream(),
        |dashboard, live_error| {
            DashboardFragment {
                dashboard,
                live_error,
            }
            .render()
        },
    ))
}

/// `GET /live/orders`
async fn orders(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    state
        .errors()
        .check(&admin.actor(), &DocPath::Orders, Operation::List, None)?;
    let subscription = watch(&state, Collection::Orders, |pool| async move {
        load_orders(&pool).await
    });
    let viewer = Viewer::new(&state, admin.id, DocPath::Orders);
    Ok(live(
        &state,
        "orders",
        viewer,
        subscription.into_stream(),
        |orders, live_error| OrdersFragment { orders, live_error }.render(),
    ))
}

/// `GET /live/users` - follows both the accounts and the admin flags.
async fn users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    state
        .errors()
        .check(&admin.actor(), &DocPath::Users, Operation::List, None)?;
    let load = |pool: sqlx::PgPool| async move { load_users(&pool).await };
    let snapshots = stream::select(
        watch(&state, Collection::Users, load).into_stream(),
        watch(&state, Collection::Admins, load).into_stream(),
    );
    let me: UserId = admin.id;
    let viewer = Viewer::new(&state, admin.id, DocPath::Users);
    Ok(live(&state, "users", viewer, snapshots, move |users, live_error| {
        UsersFragment {
            users,
            me,
            live_error,
        }
        .render()
    }))
}

/// `GET /live/messages`
async fn messages(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    state
        .errors()
        .check(&admin.actor(), &DocPath::Contacts, Operation::List, None)?;
    let subscription = watch(&state, Collection::Contacts, |pool| async move {
        load_messages(&pool).await
    });
    let viewer = Viewer::new(&state, admin.id, DocPath::Contacts);
    Ok(live(
        &state,
        "messages",
        viewer,
        subscription.into_stream(),
        |messages, live_error| {
            MessagesFragment {
                messages,
                live_error,
            }
            .render()
        },
    ))
}
