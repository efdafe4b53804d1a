//! Agency row model.

use janconnect_core::agency::{Agency, AgencyType, NodalOfficer};
use janconnect_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Row from the `agencies` table; the nodal officer is stored flattened.
#[derive(Debug, Clone, FromRow)]
pub struct AgencyRow {
    pub id: DbId,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub agency_type: AgencyType,
    pub state: String,
    pub district: Option<String>,
    pub nodal_officer_name: String,
    pub nodal_officer_email: String,
    pub nodal_officer_phone: String,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<AgencyRow> for Agency {
    fn from(row: AgencyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            agency_type: row.agency_type,
            state: row.state,
            district: row.district,
            nodal_officer: NodalOfficer {
                name: row.nodal_officer_name,
                email: row.nodal_officer_email,
                phone: row.nodal_officer_phone,
            },
            address: row.address,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
