use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{activity, balance, expenses, friends, groups, payments, user};
use engine::{Engine, users};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<users::Model> = users::Entity::find()
        .filter(users::Column::Username.eq(auth_header.username()))
        .filter(users::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub(crate) fn router(state: ServerState) -> Router {
    // Registration is the only route reachable without credentials.
    let public = Router::new()
        .route("/users", post(user::register))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/users/me", get(user::profile))
        .route("/balance/gross", get(balance::gross))
        .route("/balance/net", get(balance::net))
        .route("/groups", post(groups::create).get(groups::list))
        .route("/groups/{group_id}", delete(groups::remove))
        .route(
            "/groups/{group_id}/members",
            get(groups::members).post(groups::add_member),
        )
        .route(
            "/groups/{group_id}/members/{username}",
            delete(groups::remove_member),
        )
        .route("/groups/{group_id}/summary", get(groups::summary))
        .route("/groups/{group_id}/breakdown", get(groups::breakdown))
        .route("/groups/{group_id}/expenses", get(expenses::list))
        .route("/groups/{group_id}/balance/{netting}", get(balance::group))
        .route("/expenses", post(expenses::create))
        .route(
            "/expenses/{expense_id}",
            get(expenses::detail)
                .patch(expenses::update)
                .delete(expenses::remove),
        )
        .route("/expenses/{expense_id}/payment", put(payments::set))
        .route("/friends", get(friends::list).post(friends::add))
        .route(
            "/friends/{username}",
            get(friends::detail).delete(friends::remove),
        )
        .route("/activity", get(activity::feed))
        .route("/debts/owed", get(activity::owed))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state);

    public.merge(protected)
}

/// Builds the full application router over an existing engine and store.
///
/// Useful for driving the API in-process (integration tests) without
/// binding a listener.
pub fn app(engine: Engine, db: DatabaseConnection) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };
    router(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
