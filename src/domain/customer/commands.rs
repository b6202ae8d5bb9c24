// ============================================================================
// Customer Commands
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct NewCustomer {
    pub full_name: Option<String>,
    pub email: String,
    pub company_name: Option<String>,
    pub phone: Option<String>,
}

/// Field-level edit. `None` leaves a field untouched, `Some(None)` clears
/// a nullable one.
#[derive(Debug, Clone, Default)]
pub struct CustomerChanges {
    pub full_name: Option<Option<String>>,
    pub email: Option<String>,
    pub company_name: Option<Option<String>>,
    pub phone: Option<Option<String>>,
}
