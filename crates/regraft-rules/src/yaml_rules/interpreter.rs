//! YAML rule interpreter
//!
//! Pairs a YAML rule with its compiled [`Rule`] and runs the rule's inline
//! test cases through a [`RuleEngine`].

use regraft_core::{Rule, RuleEngine, RewriteError};
use serde::Serialize;

use super::schema::{TestCase, YamlRule};

/// A compiled YAML rule
#[derive(Debug, Clone)]
pub struct YamlRuleInterpreter {
    spec: YamlRule,
    rule: Rule,
}

impl YamlRuleInterpreter {
    /// Compile a YAML rule
    pub fn new(spec: YamlRule) -> Result<Self, RewriteError> {
        let rule = spec.compile()?;
        Ok(Self { spec, rule })
    }

    /// Get a reference to the compiled rule
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Get a reference to the rule as written
    pub fn spec(&self) -> &YamlRule {
        &self.spec
    }

    pub fn into_rule(self) -> Rule {
        self.rule
    }

    /// Run tests defined in the YAML rule
    pub fn run_tests(&self) -> Vec<TestResult> {
        self.spec
            .tests
            .iter()
            .filter(|t| !t.skip)
            .map(|test| self.run_single_test(test))
            .collect()
    }

    fn run_single_test(&self, test: &TestCase) -> TestResult {
        // A required rule would turn "should not match" cases into errors
        let mut rule = self.rule.clone();
        rule.set_required(false);

        let mut result = TestResult {
            rule_id: self.rule.id().to_string(),
            input: test.input.clone(),
            expected: test.output.clone(),
            actual: None,
            passed: false,
            error: None,
        };

        let (actual, report) = match RuleEngine::new(vec![rule]).run(&test.input) {
            Ok(run) => run,
            Err(e) => {
                result.error = Some(e.to_string());
                return result;
            }
        };
        let matched = report.total_matches() > 0;

        match &test.output {
            Some(_) if !matched => {
                result.error = Some("No matches".to_string());
            }
            Some(expected) => {
                result.passed = &actual == expected;
                result.actual = Some(actual);
            }
            None => {
                result.passed = !matched;
                if matched {
                    result.error = Some("Expected no match but rule matched".to_string());
                    result.actual = Some(actual);
                }
            }
        }

        result
    }
}

/// Result of running a single test case
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub rule_id: String,
    pub input: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub passed: bool,
    pub error: Option<String>,
}
