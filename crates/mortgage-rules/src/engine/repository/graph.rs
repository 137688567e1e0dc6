use super::{applicable, RepositoryError, RuleRepository};
use crate::engine::domain::{
    Applicability, EvaluationContext, OccupancyType, PropertyType, Rule, RuleCategory, RuleId,
    RuleSet, RuleValue,
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::RwLock;

/// Handle to one node in the rule graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeLabel {
    Rule,
    LoanProgram,
    DocumentType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    AppliesTo,
    Requires,
}

#[derive(Debug, Clone)]
struct Node {
    label: NodeLabel,
    properties: Map<String, Value>,
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    from: NodeId,
    to: NodeId,
    relation: Relation,
}

/// Property-graph store for rules. Rule nodes hold loosely typed
/// property maps; program scoping and document requirements are edges.
/// Records are decoded into [`Rule`] at the query boundary, so nothing
/// untyped escapes this module.
#[derive(Debug, Default)]
pub struct RuleGraph {
    nodes: HashMap<NodeId, Node>,
    edges: Vec<Edge>,
    next_id: u64,
}

impl RuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_node(&mut self, label: NodeLabel, properties: Map<String, Value>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node { label, properties });
        id
    }

    fn find_labeled(&self, label: NodeLabel, key: &str, value: &str) -> Option<NodeId> {
        self.nodes.iter().find_map(|(id, node)| {
            (node.label == label && node.properties.get(key).and_then(Value::as_str) == Some(value))
                .then_some(*id)
        })
    }

    fn ensure_labeled(&mut self, label: NodeLabel, key: &str, value: &str) -> NodeId {
        if let Some(id) = self.find_labeled(label, key, value) {
            return id;
        }
        let mut properties = Map::new();
        properties.insert(key.to_string(), Value::String(value.to_string()));
        self.add_node(label, properties)
    }

    fn link(&mut self, from: NodeId, to: NodeId, relation: Relation) {
        let exists = self
            .edges
            .iter()
            .any(|edge| edge.from == from && edge.to == to && edge.relation == relation);
        if !exists {
            self.edges.push(Edge { from, to, relation });
        }
    }

    fn neighbors(&self, from: NodeId, relation: Relation) -> impl Iterator<Item = NodeId> + '_ {
        self.edges
            .iter()
            .filter(move |edge| edge.from == from && edge.relation == relation)
            .map(|edge| edge.to)
    }

    fn string_property(&self, id: NodeId, key: &str) -> Option<String> {
        self.nodes
            .get(&id)?
            .properties
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Insert or replace the rule with this id, rebuilding its edges.
    pub fn upsert_rule(&mut self, rule: &Rule) {
        self.remove_rule(&rule.id);

        let mut properties = Map::new();
        properties.insert("id".to_string(), Value::String(rule.id.0.clone()));
        properties.insert(
            "category".to_string(),
            Value::String(rule.category.label().to_string()),
        );
        properties.insert("rule_type".to_string(), Value::String(rule.rule_type.clone()));
        properties.insert(
            "description".to_string(),
            Value::String(rule.description.clone()),
        );
        if let Some(property_type) = rule.applicability.property_type {
            properties.insert(
                "property_type".to_string(),
                serde_json::to_value(property_type).unwrap_or(Value::Null),
            );
        }
        if let Some(occupancy_type) = rule.applicability.occupancy_type {
            properties.insert(
                "occupancy_type".to_string(),
                serde_json::to_value(occupancy_type).unwrap_or(Value::Null),
            );
        }

        // Document lists become Requires edges; other thresholds stay
        // on the node.
        let document_list = match &rule.threshold {
            RuleValue::List(names) if rule.rule_type.starts_with("required_document") => {
                Some(names.clone())
            }
            other => {
                properties.insert(
                    "threshold".to_string(),
                    serde_json::to_value(other).unwrap_or(Value::Null),
                );
                None
            }
        };

        let rule_node = self.add_node(NodeLabel::Rule, properties);

        if let Some(program) = &rule.applicability.loan_program {
            let program_node = self.ensure_labeled(NodeLabel::LoanProgram, "name", program);
            self.link(rule_node, program_node, Relation::AppliesTo);
        }
        if let Some(names) = document_list {
            for name in names {
                let document_node = self.ensure_labeled(NodeLabel::DocumentType, "name", &name);
                self.link(rule_node, document_node, Relation::Requires);
            }
        }
    }

    /// Remove the rule node with this id and its edges. Returns whether
    /// a node was removed.
    pub fn remove_rule(&mut self, id: &RuleId) -> bool {
        let Some(node_id) = self.find_labeled(NodeLabel::Rule, "id", &id.0) else {
            return false;
        };
        self.nodes.remove(&node_id);
        self.edges
            .retain(|edge| edge.from != node_id && edge.to != node_id);
        true
    }

    /// All rules in `category`, decoded. Decoding fails the whole query
    /// rather than silently dropping a bad record.
    pub fn rules_in(&self, category: RuleCategory) -> Result<Vec<Rule>, RepositoryError> {
        let mut rules = Vec::new();
        for (id, node) in &self.nodes {
            if node.label != NodeLabel::Rule {
                continue;
            }
            let node_category = node
                .properties
                .get("category")
                .and_then(Value::as_str)
                .and_then(RuleCategory::parse);
            if node_category != Some(category) {
                continue;
            }
            rules.push(self.decode_rule(*id, node)?);
        }
        Ok(rules)
    }

    fn decode_rule(&self, node_id: NodeId, node: &Node) -> Result<Rule, RepositoryError> {
        let raw_id = node
            .properties
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| RepositoryError::Malformed {
                id: "<unknown>".to_string(),
                detail: "rule node is missing its id".to_string(),
            })?
            .to_string();

        let malformed = |detail: &str| RepositoryError::Malformed {
            id: raw_id.clone(),
            detail: detail.to_string(),
        };

        let category = node
            .properties
            .get("category")
            .and_then(Value::as_str)
            .and_then(RuleCategory::parse)
            .ok_or_else(|| malformed("unknown category"))?;
        let rule_type = node
            .properties
            .get("rule_type")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("missing rule_type"))?
            .to_string();
        let description = node
            .properties
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let property_type = match node.properties.get("property_type") {
            Some(value) => Some(
                serde_json::from_value::<PropertyType>(value.clone())
                    .map_err(|_| malformed("unknown property_type"))?,
            ),
            None => None,
        };
        let occupancy_type = match node.properties.get("occupancy_type") {
            Some(value) => Some(
                serde_json::from_value::<OccupancyType>(value.clone())
                    .map_err(|_| malformed("unknown occupancy_type"))?,
            ),
            None => None,
        };
        let loan_program = self
            .neighbors(node_id, Relation::AppliesTo)
            .next()
            .and_then(|program| self.string_property(program, "name"));

        let required: Vec<String> = self
            .neighbors(node_id, Relation::Requires)
            .filter_map(|document| self.string_property(document, "name"))
            .collect();
        let threshold = if required.is_empty() {
            let raw = node
                .properties
                .get("threshold")
                .ok_or_else(|| malformed("missing threshold"))?;
            serde_json::from_value::<RuleValue>(raw.clone())
                .map_err(|_| malformed("threshold is not a number, string, or string list"))?
        } else {
            RuleValue::List(required)
        };

        Ok(Rule {
            id: RuleId::new(raw_id),
            category,
            rule_type,
            applicability: Applicability {
                loan_program,
                property_type,
                occupancy_type,
            },
            threshold,
            description,
        })
    }
}

/// [`RuleRepository`] backed by an in-process [`RuleGraph`].
#[derive(Debug)]
pub struct GraphRuleRepository {
    graph: RwLock<RuleGraph>,
}

impl GraphRuleRepository {
    pub fn new(graph: RuleGraph) -> Self {
        Self {
            graph: RwLock::new(graph),
        }
    }

    /// Repository pre-loaded with the default lending guideline rules.
    pub fn seeded() -> Self {
        let mut graph = RuleGraph::new();
        for rule in super::seed::default_rules() {
            graph.upsert_rule(&rule);
        }
        Self::new(graph)
    }

    pub fn upsert_rule(&self, rule: &Rule) -> Result<(), RepositoryError> {
        let mut graph = self
            .graph
            .write()
            .map_err(|_| RepositoryError::Unavailable("rule graph lock poisoned".to_string()))?;
        graph.upsert_rule(rule);
        Ok(())
    }

    pub fn remove_rule(&self, id: &RuleId) -> Result<bool, RepositoryError> {
        let mut graph = self
            .graph
            .write()
            .map_err(|_| RepositoryError::Unavailable("rule graph lock poisoned".to_string()))?;
        Ok(graph.remove_rule(id))
    }
}

#[async_trait]
impl RuleRepository for GraphRuleRepository {
    async fn fetch(
        &self,
        category: RuleCategory,
        context: &EvaluationContext,
    ) -> Result<RuleSet, RepositoryError> {
        let rules = {
            let graph = self.graph.read().map_err(|_| {
                RepositoryError::Unavailable("rule graph lock poisoned".to_string())
            })?;
            graph.rules_in(category)?
        };
        Ok(applicable(rules, category, context))
    }
}
