//! Agency wire types and field rules.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::patch::{keep_or, keep_or_clear, nullable};
use crate::types::{labeled_enum, DbId, Timestamp};
use crate::validation::require_fields;

labeled_enum! {
    /// Whether the agency delivers a project overall or executes it on the ground.
    AgencyType, "agency type" {
        Implementing => "Implementing",
        Executing => "Executing",
    }
}

/// The named contact person for an agency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NodalOfficer {
    #[validate(length(min = 1, message = "Please provide nodal officer name"))]
    pub name: String,
    #[validate(custom(function = "crate::validation::officer_email"))]
    pub email: String,
    #[validate(custom(function = "crate::validation::phone"))]
    pub phone: String,
}

/// Full agency representation returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agency {
    pub id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub agency_type: AgencyType,
    pub state: String,
    pub district: Option<String>,
    pub nodal_officer: NodalOfficer,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Minimal agency listing exposed without authentication (signup picker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAgency {
    pub id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub agency_type: AgencyType,
    pub state: String,
    pub district: Option<String>,
}

impl From<&Agency> for PublicAgency {
    fn from(agency: &Agency) -> Self {
        Self {
            id: agency.id,
            name: agency.name.clone(),
            agency_type: agency.agency_type,
            state: agency.state.clone(),
            district: agency.district.clone(),
        }
    }
}

/// Every persisted agency attribute a create or update can set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgencyFields {
    pub name: String,
    pub agency_type: AgencyType,
    pub state: String,
    pub district: Option<String>,
    pub nodal_officer: NodalOfficer,
    pub address: Option<String>,
    pub is_active: bool,
}

impl AgencyFields {
    pub fn validate(&self) -> Result<(), CoreError> {
        require_fields(&[Some(self.name.as_str()), Some(self.state.as_str())])?;
        self.nodal_officer.validate()?;
        Ok(())
    }
}

impl From<&Agency> for AgencyFields {
    fn from(agency: &Agency) -> Self {
        Self {
            name: agency.name.clone(),
            agency_type: agency.agency_type,
            state: agency.state.clone(),
            district: agency.district.clone(),
            nodal_officer: agency.nodal_officer.clone(),
            address: agency.address.clone(),
            is_active: agency.is_active,
        }
    }
}

/// Body of `POST /agencies`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAgency {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub agency_type: Option<AgencyType>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub nodal_officer: Option<NodalOfficer>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

impl NewAgency {
    pub fn into_fields(self) -> Result<AgencyFields, CoreError> {
        let (Some(name), Some(agency_type), Some(state), Some(nodal_officer)) =
            (self.name, self.agency_type, self.state, self.nodal_officer)
        else {
            return Err(CoreError::Validation(
                crate::validation::MISSING_FIELDS_MESSAGE.to_string(),
            ));
        };
        let fields = AgencyFields {
            name: name.trim().to_string(),
            agency_type,
            state,
            district: self.district,
            nodal_officer,
            address: self.address,
            is_active: self.is_active.unwrap_or(true),
        };
        fields.validate()?;
        Ok(fields)
    }
}

/// Body of `PUT /agencies/{id}`. A supplied `nodalOfficer` replaces the stored one.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub agency_type: Option<AgencyType>,
    pub state: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub district: Option<Option<String>>,
    pub nodal_officer: Option<NodalOfficer>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl AgencyPatch {
    /// Merge onto `fields` and re-validate the result.
    pub fn apply(self, fields: &mut AgencyFields) -> Result<(), CoreError> {
        keep_or(&mut fields.name, self.name);
        keep_or(&mut fields.agency_type, self.agency_type);
        keep_or(&mut fields.state, self.state);
        keep_or_clear(&mut fields.district, self.district);
        keep_or(&mut fields.nodal_officer, self.nodal_officer);
        keep_or_clear(&mut fields.address, self.address);
        keep_or(&mut fields.is_active, self.is_active);
        fields.validate()
    }
}
