use serde::{Deserialize, Serialize};

/// Messages posted from the comparison grid back to the host shell. Payloads
/// carry underlying revision/row identifiers, never display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum OutboundMessage {
    #[serde(rename = "REORDER_PLOTS_COMPARISON")]
    ReorderPlotsComparison(Vec<String>),
    #[serde(rename = "REORDER_PLOTS_COMPARISON_ROWS")]
    ReorderPlotsComparisonRows(Vec<String>),
    #[serde(rename = "REFRESH_REVISION")]
    RefreshRevision(String),
}

pub trait HostChannel {
    fn post(&self, message: OutboundMessage);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_reorder_message_with_type_and_payload() {
        let message = OutboundMessage::ReorderPlotsComparison(vec![
            "main".to_string(),
            "exp-e7a67".to_string(),
        ]);
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({ "type": "REORDER_PLOTS_COMPARISON", "payload": ["main", "exp-e7a67"] })
        );
    }

    #[test]
    fn serializes_row_reorder_and_refresh_messages() {
        let rows = OutboundMessage::ReorderPlotsComparisonRows(vec!["plots/loss.png".to_string()]);
        assert_eq!(
            serde_json::to_value(&rows).unwrap(),
            json!({ "type": "REORDER_PLOTS_COMPARISON_ROWS", "payload": ["plots/loss.png"] })
        );

        let refresh = OutboundMessage::RefreshRevision("workspace".to_string());
        assert_eq!(
            serde_json::to_value(&refresh).unwrap(),
            json!({ "type": "REFRESH_REVISION", "payload": "workspace" })
        );
    }

    #[test]
    fn round_trips_from_wire_shape() {
        let message: OutboundMessage = serde_json::from_value(
            json!({ "type": "REFRESH_REVISION", "payload": "exp-83425" }),
        )
        .unwrap();
        assert_eq!(
            message,
            OutboundMessage::RefreshRevision("exp-83425".to_string())
        );
    }
}
