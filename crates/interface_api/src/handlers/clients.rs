//! Client handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::ClientId;
use domain_access::Actor;
use domain_registry::{Client, ClientUpdate, NewClient};

use crate::dto::registry::{CreateClientRequest, UpdateClientRequest};
use crate::error::ApiError;
use crate::AppState;

/// Registers a client
pub async fn create_client(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateClientRequest>,
) -> Result<Json<Client>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let client = state
        .clients
        .create_client(
            &actor,
            NewClient {
                name: request.name,
                email: request.email,
                cpf: request.cpf,
                phone: request.phone,
                address: request.address,
            },
        )
        .await?;
    Ok(Json(client))
}

/// Lists all clients
pub async fn list_clients(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Client>>, ApiError> {
    Ok(Json(state.clients.list_clients(&actor).await?))
}

/// Fetches one client
pub async fn get_client(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Client>, ApiError> {
    Ok(Json(
        state.clients.get_client(&actor, ClientId::from(id)).await?,
    ))
}

/// Updates a client's contact data
pub async fn update_client(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateClientRequest>,
) -> Result<Json<Client>, ApiError> {
    let client = state
        .clients
        .update_client(
            &actor,
            ClientId::from(id),
            ClientUpdate {
                name: request.name,
                email: request.email,
                phone: request.phone.map(Some),
                address: request.address.map(Some),
            },
        )
        .await?;
    Ok(Json(client))
}
