//! Search-mode query builders and cross-cutting filter application.
//!
//! Each search mode mirrors one submit button on the portal's search form.
//! The portal reads search terms from *both* the cookie jar and the POST
//! body, so every builder mutates the session and returns the matching form
//! payload. Field names diverge between the two layers for the map/parcel
//! form (`DIST` cookie vs `SDIST` payload field, and so on) — that mismatch
//! is the portal's, and we reproduce it exactly.

use crate::session::SessionState;

/// One form-encoded POST body. Freshly built per request, immutable once
/// handed to the client.
pub type SearchPayload = Vec<(String, String)>;

/// The minimal payload that advances to the next results page without
/// resubmitting any search fields.
pub fn next_page_payload() -> SearchPayload {
    vec![("TASK".to_string(), "NEXT".to_string())]
}

/// One of the four search modes the portal supports.
#[derive(Debug, Clone)]
pub enum SearchQuery {
    /// Taxpayer name, "last first" free text. Not validated.
    Name { name: String },
    /// Taxpayer account number.
    Account { account: String },
    /// Tax year + ticket number + optional suffix.
    Ticket {
        year: String,
        ticket: String,
        suffix: String,
    },
    /// District / map / parcel / sub-parcel, each optional.
    MapParcel {
        district: String,
        map: String,
        parcel: String,
        sub_parcel: String,
    },
}

impl SearchQuery {
    /// Apply this query's cookie deltas to the session and return the
    /// initial search payload. Common parameters are applied separately by
    /// [`CommonParams::apply`] before the payload is considered final.
    pub fn build(&self, session: &mut SessionState) -> SearchPayload {
        match self {
            SearchQuery::Name { name } => {
                tracing::info!(name, "performing name search");
                session.set("TPNAME", name);
                vec![
                    ("TPNAME".to_string(), name.clone()),
                    ("SBYNAME".to_string(), "Search by Name".to_string()),
                ]
            }
            SearchQuery::Account { account } => {
                tracing::info!(account, "performing account search");
                session.set("TPACCT", account);
                vec![
                    ("TPACCT".to_string(), account.clone()),
                    ("SBYACCT".to_string(), "Search by Account".to_string()),
                ]
            }
            SearchQuery::Ticket {
                year,
                ticket,
                suffix,
            } => {
                tracing::info!(year, ticket, suffix, "performing ticket search");
                session.set("TPTYR", year);
                session.set("TPTICK", ticket);
                session.set("TPSX", suffix);
                vec![
                    ("TPTYR".to_string(), year.clone()),
                    ("TPTICK".to_string(), ticket.clone()),
                    ("TPSX".to_string(), suffix.clone()),
                    ("SBYTICKET".to_string(), "Search by Ticket".to_string()),
                ]
            }
            SearchQuery::MapParcel {
                district,
                map,
                parcel,
                sub_parcel,
            } => {
                tracing::info!(district, map, parcel, sub_parcel, "performing map search");
                // Cookie layer uses the bare names, payload layer the
                // S-prefixed ones. Historical divergence on the portal side.
                session.set("DIST", district);
                session.set("MAP", map);
                session.set("PARC", parcel);
                session.set("SPAR", sub_parcel);
                vec![
                    ("SDIST".to_string(), district.clone()),
                    ("SMAP".to_string(), map.clone()),
                    ("SPAR".to_string(), parcel.clone()),
                    ("SSPAR".to_string(), sub_parcel.clone()),
                    ("SBYMAP".to_string(), "Search by Map/Parcel".to_string()),
                ]
            }
        }
    }
}

/// Cross-cutting search filters, independent of search mode.
///
/// Only entries with a non-empty value are applied. Application is
/// idempotent: re-applying the same filters leaves the session unchanged.
#[derive(Debug, Clone, Default)]
pub struct CommonParams {
    /// Limit results to a single tax year.
    pub limit_year: Option<String>,
    /// Property type: B = both, R = real, P = personal.
    pub prop_type: Option<String>,
    /// Payment status: B = both, P = paid, U = unpaid.
    pub status: Option<String>,
    /// District code filter (e.g. "01").
    pub district: Option<String>,
}

impl CommonParams {
    /// Apply the filters to the session's cookie state.
    ///
    /// Some filters need a lowercase-named duplicate cookie, and district
    /// additionally needs `SDIST` for the forms that read that name instead.
    /// Case matters to the backend, so both spellings are sent.
    pub fn apply(&self, session: &mut SessionState) {
        let entries = [
            ("limit_year", &self.limit_year),
            ("prop_type", &self.prop_type),
            ("status", &self.status),
            ("district", &self.district),
        ];

        for (param, value) in entries {
            let Some(value) = value else { continue };
            if value.is_empty() {
                continue;
            }

            match param {
                "limit_year" => {
                    session.set("LYEAR", value);
                    session.set("lyear", value);
                }
                "prop_type" => {
                    session.set("RPB", value);
                    session.set("rpb", value);
                }
                "status" => {
                    session.set("PUB", value);
                    session.set("pub", value);
                }
                "district" => {
                    session.set("DIST", value);
                    session.set("SDIST", value);
                }
                _ => unreachable!(),
            }
            tracing::debug!(param, value, "applied common search parameter");
        }
    }
}
