//! Agent State Repository
//!
//! Desired-config snapshots in `workspace_agentk_states`.

use devspace_core::domain::agent_state::AgentState;
use sqlx::PgConnection;
use uuid::Uuid;

use super::records::NewAgentState;

pub async fn create(conn: &mut PgConnection, new: NewAgentState) -> Result<AgentState, sqlx::Error> {
    let state = AgentState {
        id: Uuid::new_v4(),
        workspace_id: new.workspace_id,
        project_id: new.project_id,
        desired_config: new.desired_config,
        created_at: chrono::Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO workspace_agentk_states (id, workspace_id, project_id, desired_config, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(state.id)
    .bind(state.workspace_id)
    .bind(state.project_id)
    .bind(&state.desired_config)
    .bind(state.created_at)
    .execute(conn)
    .await?;

    Ok(state)
}
