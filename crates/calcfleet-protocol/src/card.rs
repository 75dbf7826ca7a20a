use serde::{Deserialize, Serialize};

/// Well-known path where every agent serves its card.
pub const AGENT_CARD_PATH: &str = "/.well-known/agent.json";

/// Optional protocol capabilities advertised by an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCapabilities {
    #[serde(default)]
    pub streaming: bool,
}

/// One advertised skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub examples: Vec<String>,
}

/// Discovery document describing an agent endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub url: String,
    pub version: String,
    pub default_input_modes: Vec<String>,
    pub default_output_modes: Vec<String>,
    pub capabilities: AgentCapabilities,
    pub skills: Vec<AgentSkill>,
}

impl AgentCard {
    /// Text-in/text-out card with a single skill, the shape every agent in
    /// this cluster uses.
    pub fn text_agent(
        name: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        skill: AgentSkill,
    ) -> Self {
        AgentCard {
            name: name.into(),
            description: description.into(),
            url: url.into(),
            version: "1.0.0".to_string(),
            default_input_modes: vec!["text".to_string()],
            default_output_modes: vec!["text".to_string()],
            capabilities: AgentCapabilities::default(),
            skills: vec![skill],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_serializes_camel_case_mode_lists() {
        let card = AgentCard::text_agent(
            "Addition Agent",
            "Adds numbers",
            "http://127.0.0.1:18201",
            AgentSkill {
                id: "addition".to_string(),
                name: "Addition".to_string(),
                description: "Adds numbers via the arithmetic toolkit".to_string(),
                tags: vec!["math".to_string()],
                examples: vec!["Add 12 and 30".to_string()],
            },
        );
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["defaultInputModes"][0], "text");
        assert_eq!(json["skills"][0]["id"], "addition");
        let back: AgentCard = serde_json::from_value(json).unwrap();
        assert_eq!(back, card);
    }
}
