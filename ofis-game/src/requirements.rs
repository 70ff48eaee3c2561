//! Requirement tree evaluation.
//!
//! Cards gate their eligibility on a boolean tree of meter comparisons.
//! Evaluation fails closed: a malformed node, an unknown meter, or an
//! unknown comparison makes that node false. A bad requirement must never
//! take the session down with it, so parsing is lenient too — anything
//! that does not match the group or leaf shape becomes [`RequirementNode::Malformed`]
//! instead of a deck-wide parse error.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::resources::{ResourceKey, Resources};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Gt,
    Lt,
    Gte,
    Lte,
    Eq,
}

impl Comparison {
    fn parse(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "gt" => Some(Self::Gt),
            "lt" => Some(Self::Lt),
            "gte" => Some(Self::Gte),
            "lte" => Some(Self::Lte),
            "eq" => Some(Self::Eq),
            _ => None,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Eq => "eq",
        }
    }

    fn holds(self, current: f32, value: f32) -> bool {
        match self {
            Self::Gt => current > value,
            Self::Lt => current < value,
            Self::Gte => current >= value,
            Self::Lte => current <= value,
            Self::Eq => (current - value).abs() < f32::EPSILON,
        }
    }
}

/// A requirement tree node: an AND/OR group, a single meter comparison, or
/// an unrecognized shape kept around so evaluation can fail it closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum RequirementNode {
    Group {
        op: GroupOp,
        conditions: Vec<RequirementNode>,
    },
    Leaf {
        resource: ResourceKey,
        comparison: Comparison,
        value: f32,
    },
    Malformed,
}

impl RequirementNode {
    /// Vacuously true node, the parse of `{}` / `null`.
    #[must_use]
    pub const fn vacuous() -> Self {
        Self::Group {
            op: GroupOp::And,
            conditions: Vec::new(),
        }
    }
}

impl From<Value> for RequirementNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::vacuous(),
            Value::Object(map) => from_object(&map),
            _ => Self::Malformed,
        }
    }
}

fn from_object(map: &Map<String, Value>) -> RequirementNode {
    if map.is_empty() {
        return RequirementNode::vacuous();
    }

    if let (Some(Value::String(kind)), Some(Value::Array(conditions))) =
        (map.get("type"), map.get("conditions"))
    {
        let op = match kind.to_ascii_lowercase().as_str() {
            "and" => GroupOp::And,
            "or" => GroupOp::Or,
            _ => return RequirementNode::Malformed,
        };
        let conditions = conditions
            .iter()
            .map(|child| RequirementNode::from(child.clone()))
            .collect();
        return RequirementNode::Group { op, conditions };
    }

    if let (Some(Value::String(resource)), Some(Value::String(comparison)), Some(value)) =
        (map.get("resource"), map.get("comparison"), map.get("value"))
    {
        let Some(resource) = ResourceKey::parse(resource) else {
            return RequirementNode::Malformed;
        };
        let Some(comparison) = Comparison::parse(comparison) else {
            return RequirementNode::Malformed;
        };
        let Some(value) = value.as_f64() else {
            return RequirementNode::Malformed;
        };
        #[allow(clippy::cast_possible_truncation)]
        return RequirementNode::Leaf {
            resource,
            comparison,
            value: value as f32,
        };
    }

    RequirementNode::Malformed
}

impl From<RequirementNode> for Value {
    fn from(node: RequirementNode) -> Self {
        match node {
            RequirementNode::Group { op, conditions } => {
                let kind = match op {
                    GroupOp::And => "and",
                    GroupOp::Or => "or",
                };
                let conditions: Vec<Value> = conditions.into_iter().map(Value::from).collect();
                json!({ "type": kind, "conditions": conditions })
            }
            RequirementNode::Leaf {
                resource,
                comparison,
                value,
            } => json!({
                "resource": resource.as_str(),
                "comparison": comparison.as_str(),
                "value": value,
            }),
            RequirementNode::Malformed => Value::Null,
        }
    }
}

/// Evaluate a requirement tree against the current meters. An absent tree
/// is vacuously true.
#[must_use]
pub fn evaluate(node: Option<&RequirementNode>, snapshot: &Resources) -> bool {
    node.is_none_or(|node| eval_node(node, snapshot))
}

fn eval_node(node: &RequirementNode, snapshot: &Resources) -> bool {
    match node {
        RequirementNode::Group { op, conditions } => match op {
            GroupOp::And => conditions.iter().all(|child| eval_node(child, snapshot)),
            GroupOp::Or => conditions.iter().any(|child| eval_node(child, snapshot)),
        },
        RequirementNode::Leaf {
            resource,
            comparison,
            value,
        } => comparison.holds(snapshot.get(*resource), *value),
        RequirementNode::Malformed => {
            warn!("malformed requirement node, failing closed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(resource: &str, comparison: &str, value: f32) -> RequirementNode {
        RequirementNode::from(json!({
            "resource": resource,
            "comparison": comparison,
            "value": value,
        }))
    }

    fn snapshot(boss: f32) -> Resources {
        Resources {
            boss,
            ..Resources::default()
        }
    }

    #[test]
    fn absent_and_empty_nodes_are_vacuously_true() {
        let state = Resources::default();
        assert!(evaluate(None, &state));
        assert!(evaluate(Some(&RequirementNode::from(json!({}))), &state));
        assert!(evaluate(Some(&RequirementNode::from(Value::Null)), &state));
    }

    #[test]
    fn and_group_requires_all_children() {
        let node = RequirementNode::from(json!({
            "type": "AND",
            "conditions": [
                { "resource": "boss", "comparison": "gte", "value": 50 }
            ]
        }));
        assert!(evaluate(Some(&node), &snapshot(50.0)));

        let node = RequirementNode::from(json!({
            "type": "and",
            "conditions": [
                { "resource": "boss", "comparison": "gte", "value": 51 }
            ]
        }));
        assert!(!evaluate(Some(&node), &snapshot(50.0)));
    }

    #[test]
    fn or_group_requires_any_child() {
        let state = snapshot(50.0);
        let node = RequirementNode::from(json!({
            "type": "or",
            "conditions": [
                { "resource": "boss", "comparison": "gt", "value": 90 },
                { "resource": "boss", "comparison": "lte", "value": 50 }
            ]
        }));
        assert!(evaluate(Some(&node), &state));

        let node = RequirementNode::from(json!({
            "type": "or",
            "conditions": [
                { "resource": "boss", "comparison": "gt", "value": 90 },
                { "resource": "boss", "comparison": "lt", "value": 10 }
            ]
        }));
        assert!(!evaluate(Some(&node), &state));
    }

    #[test]
    fn comparisons_match_their_operators() {
        let state = snapshot(50.0);
        assert!(evaluate(Some(&leaf("boss", "eq", 50.0)), &state));
        assert!(!evaluate(Some(&leaf("boss", "eq", 49.0)), &state));
        assert!(evaluate(Some(&leaf("boss", "lt", 51.0)), &state));
        assert!(!evaluate(Some(&leaf("boss", "gt", 50.0)), &state));
        assert!(evaluate(Some(&leaf("boss", "lte", 50.0)), &state));
    }

    #[test]
    fn day_counter_is_a_valid_resource() {
        let mut state = Resources::default();
        state.day = 70;
        assert!(evaluate(Some(&leaf("day", "gte", 70.0)), &state));
        assert!(!evaluate(Some(&leaf("day", "gt", 70.0)), &state));
    }

    #[test]
    fn malformed_shapes_fail_closed() {
        let state = Resources::default();
        // unknown group type
        let node = RequirementNode::from(json!({
            "type": "xor",
            "conditions": [{ "resource": "boss", "comparison": "gte", "value": 0 }]
        }));
        assert!(!evaluate(Some(&node), &state));
        // unknown resource
        assert!(!evaluate(Some(&leaf("charisma", "gte", 0.0)), &state));
        // unknown comparison
        assert!(!evaluate(Some(&leaf("boss", "between", 0.0)), &state));
        // neither group nor leaf shape
        let node = RequirementNode::from(json!({ "surprise": true }));
        assert_eq!(node, RequirementNode::Malformed);
        assert!(!evaluate(Some(&node), &state));
        // non-numeric value
        let node = RequirementNode::from(json!({
            "resource": "boss", "comparison": "gte", "value": "high"
        }));
        assert!(!evaluate(Some(&node), &state));
    }

    #[test]
    fn malformed_child_fails_its_group_but_parses() {
        let json = r#"{
            "type": "and",
            "conditions": [{ "bogus": 1 }]
        }"#;
        let node: RequirementNode = serde_json::from_str(json).unwrap();
        assert!(!evaluate(Some(&node), &Resources::default()));
    }

    #[test]
    fn nodes_round_trip_through_json() {
        let node = RequirementNode::from(json!({
            "type": "or",
            "conditions": [
                { "resource": "motivation", "comparison": "lt", "value": 20 },
                { "resource": "day", "comparison": "gte", "value": 10 }
            ]
        }));
        let serialized = serde_json::to_value(node.clone()).unwrap();
        assert_eq!(RequirementNode::from(serialized), node);
    }
}
