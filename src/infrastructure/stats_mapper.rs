// Mapper from the stats endpoint's JSON body to domain types
use crate::domain::lenient;
use crate::domain::stats::{
    EditorTally, MonthlyUploads, PaymentRecord, PaymentTally, Section, SectionPayload,
    SectionRows, StatsResponse, StatsSummary, SubscriptionUsage, UserSummary,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct WireStats {
    #[serde(default)]
    total_publications: Option<u64>,
    #[serde(default)]
    approved: Option<u64>,
    #[serde(default)]
    rejected: Option<u64>,
    #[serde(default)]
    under_review: Option<u64>,
    #[serde(default)]
    draft: Option<u64>,
    #[serde(default)]
    total_likes: Option<u64>,
    #[serde(default)]
    total_dislikes: Option<u64>,
    #[serde(default, deserialize_with = "lenient::amount")]
    total_payments: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    total_subscriptions: f64,
    #[serde(flatten)]
    rest: HashMap<String, Value>,
}

/// A section arrives either as a `{results, count}` envelope or as a bare
/// array. An envelope without `count` is treated like a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WirePayload<T> {
    Envelope {
        results: Option<Vec<T>>,
        count: Option<u64>,
    },
    Bare(Vec<T>),
}

fn decode_payload<T: DeserializeOwned>(value: Value) -> serde_json::Result<(Vec<T>, Option<u64>)> {
    Ok(match serde_json::from_value::<WirePayload<T>>(value)? {
        WirePayload::Envelope { results, count } => (results.unwrap_or_default(), count),
        WirePayload::Bare(rows) => (rows, None),
    })
}

fn decode_section(section: Section, value: Value) -> serde_json::Result<SectionPayload> {
    let (rows, count) = match section {
        Section::Monthly => {
            let (rows, count) = decode_payload::<MonthlyUploads>(value)?;
            (SectionRows::Monthly(rows), count)
        }
        Section::Editors => {
            let (rows, count) = decode_payload::<EditorTally>(value)?;
            (SectionRows::Editors(rows), count)
        }
        Section::Payments => {
            let (rows, count) = decode_payload::<PaymentTally>(value)?;
            (SectionRows::Payments(rows), count)
        }
        Section::Subscriptions => {
            let (rows, count) = decode_payload::<SubscriptionUsage>(value)?;
            (SectionRows::Subscriptions(rows), count)
        }
        Section::Users => {
            let (rows, count) = decode_payload::<UserSummary>(value)?;
            (SectionRows::Users(rows), count)
        }
        Section::AllPayments => {
            let (rows, count) = decode_payload::<PaymentRecord>(value)?;
            (SectionRows::AllPayments(rows), count)
        }
    };

    Ok(match count {
        Some(count) => SectionPayload::Paged { rows, count },
        None => SectionPayload::Unpaged { rows },
    })
}

/// Decodes the aggregate stats body. Sections missing from the body (or
/// sent as `null`) are left out of the result.
pub fn decode_stats(body: &[u8]) -> Result<StatsResponse, String> {
    let mut wire: WireStats = serde_json::from_slice(body).map_err(|e| e.to_string())?;

    let summary = StatsSummary {
        total_publications: wire.total_publications.unwrap_or(0),
        approved: wire.approved.unwrap_or(0),
        rejected: wire.rejected.unwrap_or(0),
        under_review: wire.under_review.unwrap_or(0),
        draft: wire.draft.unwrap_or(0),
        total_likes: wire.total_likes.unwrap_or(0),
        total_dislikes: wire.total_dislikes.unwrap_or(0),
        total_payments: wire.total_payments,
        total_subscriptions: wire.total_subscriptions,
    };

    let mut response = StatsResponse {
        summary,
        ..Default::default()
    };

    for section in Section::ALL {
        let Some(value) = wire.rest.remove(section.response_key()) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let payload = decode_section(section, value)
            .map_err(|e| format!("section {}: {}", section.response_key(), e))?;
        response.sections.insert(section, payload);
    }

    Ok(response)
}
