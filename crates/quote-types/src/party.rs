//! Issuer and recipient details printed in the document header and info boxes

/// Printed in place of a recipient field the user left empty
pub const PLACEHOLDER: &str = "_________________";

/// Party details as entered; every field is optional
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct PartyInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub tax_office: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Fallback values used when the issuer fields are blank
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IssuerDefaults {
    #[serde(default = "default_issuer_name")]
    pub name: String,
    #[serde(default = "default_issuer_tax_id")]
    pub tax_id: String,
    #[serde(default = "default_issuer_tax_office")]
    pub tax_office: String,
}

fn default_issuer_name() -> String {
    "IT DEV".to_string()
}

fn default_issuer_tax_id() -> String {
    "802223278".to_string()
}

fn default_issuer_tax_office() -> String {
    "ΙΖ ΑΘΗΝΩΝ".to_string()
}

impl Default for IssuerDefaults {
    fn default() -> Self {
        Self {
            name: default_issuer_name(),
            tax_id: default_issuer_tax_id(),
            tax_office: default_issuer_tax_office(),
        }
    }
}

/// Party details with every field filled in for printing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParty {
    pub name: String,
    pub tax_id: String,
    pub tax_office: String,
    pub address: String,
}

impl PartyInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = Some(tax_id.into());
        self
    }

    pub fn with_tax_office(mut self, tax_office: impl Into<String>) -> Self {
        self.tax_office = Some(tax_office.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Resolve as the document issuer: blank fields fall back to `defaults`
    pub fn resolve_issuer(&self, defaults: &IssuerDefaults) -> ResolvedParty {
        ResolvedParty {
            name: filled(&self.name).unwrap_or(defaults.name.as_str()).to_string(),
            tax_id: filled(&self.tax_id).unwrap_or(defaults.tax_id.as_str()).to_string(),
            tax_office: filled(&self.tax_office)
                .unwrap_or(defaults.tax_office.as_str())
                .to_string(),
            address: filled(&self.address).unwrap_or_default().to_string(),
        }
    }

    /// Resolve as the recipient: blank fields print as a fill-in line
    pub fn resolve_recipient(&self) -> ResolvedParty {
        let or_placeholder =
            |field: &Option<String>| filled(field).unwrap_or(PLACEHOLDER).to_string();
        ResolvedParty {
            name: or_placeholder(&self.name),
            tax_id: or_placeholder(&self.tax_id),
            tax_office: or_placeholder(&self.tax_office),
            address: or_placeholder(&self.address),
        }
    }
}

fn filled(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
