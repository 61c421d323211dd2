//! Workspace Variable Repository

use devspace_core::domain::variable::WorkspaceVariable;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use super::records::NewWorkspaceVariable;

/// Bulk insert in a single statement
pub async fn create_all(
    conn: &mut PgConnection,
    new: Vec<NewWorkspaceVariable>,
) -> Result<Vec<WorkspaceVariable>, sqlx::Error> {
    if new.is_empty() {
        return Ok(Vec::new());
    }

    let variables: Vec<WorkspaceVariable> = new
        .into_iter()
        .map(|v| WorkspaceVariable {
            id: Uuid::new_v4(),
            workspace_id: v.workspace_id,
            key: v.key,
            value: v.value,
            variable_type: v.variable_type,
            user_provided: v.user_provided,
        })
        .collect();

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO workspace_variables (id, workspace_id, key, value, variable_type, user_provided) ",
    );
    builder.push_values(&variables, |mut row, v| {
        row.push_bind(v.id)
            .push_bind(v.workspace_id)
            .push_bind(&v.key)
            .push_bind(&v.value)
            .push_bind(v.variable_type.as_i16())
            .push_bind(v.user_provided);
    });
    builder.build().execute(conn).await?;

    Ok(variables)
}
