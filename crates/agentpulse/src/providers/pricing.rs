//! Rate cards and token accounting.

use agentpulse_protocol::AgentId;

use super::{Completion, ProviderError};

const PER_MILLION: f64 = 1_000_000.0;

/// How a vendor charges, in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pricing {
    /// Separate input and output rates applied to vendor-reported usage.
    PerToken { input: f64, output: f64 },
    /// One rate applied to an estimated total.
    Flat { rate: f64 },
}

/// Tokens and cost attributed to one completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Charge {
    pub tokens: u64,
    pub cost: f64,
    /// True when `tokens` is a length-based estimate.
    pub estimated: bool,
}

impl Pricing {
    /// The rate card for a built-in agent.
    pub fn for_agent(agent: AgentId) -> Self {
        match agent {
            AgentId::Claude => Pricing::PerToken {
                input: 3.0,
                output: 15.0,
            },
            AgentId::Gpt4 => Pricing::PerToken {
                input: 10.0,
                output: 30.0,
            },
            AgentId::Gemini => Pricing::Flat { rate: 1.0 },
        }
    }

    /// Compute tokens and cost for a completion.
    ///
    /// Per-token pricing needs vendor-reported usage. Flat pricing always
    /// estimates from the prompt and response lengths.
    pub fn charge(&self, prompt: &str, completion: &Completion) -> Result<Charge, ProviderError> {
        match *self {
            Pricing::PerToken { input, output } => {
                let usage = completion.usage.ok_or_else(|| {
                    ProviderError::Parse("response did not include token usage".to_string())
                })?;
                Ok(Charge {
                    tokens: usage.total(),
                    cost: usage.input as f64 * input / PER_MILLION
                        + usage.output as f64 * output / PER_MILLION,
                    estimated: false,
                })
            }
            Pricing::Flat { rate } => {
                let tokens = estimate_tokens(prompt, &completion.text);
                Ok(Charge {
                    tokens,
                    cost: tokens as f64 * rate / PER_MILLION,
                    estimated: true,
                })
            }
        }
    }
}

/// `ceil((prompt_chars + response_chars) / 4)`.
pub fn estimate_tokens(prompt: &str, response: &str) -> u64 {
    let chars = (prompt.chars().count() + response.chars().count()) as u64;
    chars.div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::TokenUsage;

    fn completion(text: &str, usage: Option<(u64, u64)>) -> Completion {
        Completion {
            text: text.to_string(),
            usage: usage.map(|(input, output)| TokenUsage { input, output }),
        }
    }

    #[test]
    fn anthropic_rates() {
        let charge = Pricing::for_agent(AgentId::Claude)
            .charge("p", &completion("r", Some((1_000, 2_000))))
            .unwrap();
        assert_eq!(charge.tokens, 3_000);
        assert!((charge.cost - (0.003 + 0.03)).abs() < 1e-12);
        assert!(!charge.estimated);
    }

    #[test]
    fn openai_rates() {
        let charge = Pricing::for_agent(AgentId::Gpt4)
            .charge("p", &completion("r", Some((1_000_000, 0))))
            .unwrap();
        assert!((charge.cost - 10.0).abs() < 1e-9);
    }

    #[test]
    fn flat_rate_estimates_from_length() {
        // 5 + 6 chars -> ceil(11 / 4) = 3
        let charge = Pricing::for_agent(AgentId::Gemini)
            .charge("hello", &completion("world!", Some((999, 999))))
            .unwrap();
        assert_eq!(charge.tokens, 3);
        assert!((charge.cost - 3.0 / 1_000_000.0).abs() < 1e-15);
        assert!(charge.estimated);
    }

    #[test]
    fn per_token_without_usage_is_rejected() {
        let err = Pricing::for_agent(AgentId::Claude)
            .charge("p", &completion("r", None))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[test]
    fn estimate_counts_chars_not_bytes() {
        assert_eq!(estimate_tokens("żółw", ""), 1);
        assert_eq!(estimate_tokens("", ""), 0);
        assert_eq!(estimate_tokens("abcd", "e"), 2);
    }
}
