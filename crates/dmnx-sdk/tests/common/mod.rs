//! Shared fixtures for SDK integration tests

#![allow(dead_code)]

use dmnx_sdk::{ExecutorConfig, Executor, Outcome, RunOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const ELIGIBILITY: &str = r##"<definitions xmlns="https://www.omg.org/spec/DMN/20191111/MODEL/"
    name="Eligibility" namespace="urn:eligibility">
  <inputData id="i_age" name="age"><variable name="age" typeRef="number"/></inputData>
  <decision id="d_eligible" name="Eligible">
    <variable name="Eligible" typeRef="boolean"/>
    <informationRequirement><requiredInput href="#i_age"/></informationRequirement>
    <literalExpression><text>age &gt;= 18</text></literalExpression>
  </decision>
</definitions>"##;

pub const ARITHMETIC: &str = r##"<definitions xmlns="https://www.omg.org/spec/DMN/20191111/MODEL/"
    name="Arithmetic" namespace="urn:arithmetic">
  <inputData id="i_x" name="x"/>
  <decision id="d_echo" name="Echo">
    <informationRequirement><requiredInput href="#i_x"/></informationRequirement>
    <literalExpression><text>x</text></literalExpression>
  </decision>
  <decision id="d_sum" name="Sum">
    <literalExpression><text>0.1 + 0.2</text></literalExpression>
  </decision>
  <decision id="d_third" name="Third">
    <literalExpression><text>1 / 3</text></literalExpression>
  </decision>
</definitions>"##;

pub const LOAN: &str = r##"<definitions xmlns="https://www.omg.org/spec/DMN/20191111/MODEL/"
    name="Loan" namespace="urn:loan">
  <inputData id="i_age" name="Age"><variable name="Age" typeRef="number"/></inputData>
  <inputData id="i_income" name="Income"><variable name="Income" typeRef="number"/></inputData>
  <decision id="d_adult" name="Adult">
    <variable name="Adult" typeRef="boolean"/>
    <informationRequirement><requiredInput href="#i_age"/></informationRequirement>
    <literalExpression><text>Age &gt;= 18</text></literalExpression>
  </decision>
  <decision id="d_broken" name="Broken">
    <informationRequirement><requiredInput href="#i_income"/></informationRequirement>
    <literalExpression><text>"a" * Income</text></literalExpression>
  </decision>
  <decision id="d_rate" name="Rate">
    <variable name="Rate" typeRef="number"/>
    <informationRequirement><requiredDecision href="#d_adult"/></informationRequirement>
    <knowledgeRequirement><requiredKnowledge href="#b_rate"/></knowledgeRequirement>
    <invocation>
      <literalExpression><text>Rate Table</text></literalExpression>
      <binding><parameter name="adult"/><literalExpression><text>Adult</text></literalExpression></binding>
    </invocation>
  </decision>
  <businessKnowledgeModel id="b_rate" name="Rate Table">
    <variable name="Rate Table"/>
    <encapsulatedLogic>
      <formalParameter name="adult" typeRef="boolean"/>
      <decisionTable hitPolicy="UNIQUE">
        <input><inputExpression><text>adult</text></inputExpression></input>
        <output name="rate"/>
        <rule><inputEntry><text>true</text></inputEntry><outputEntry><text>0.05</text></outputEntry></rule>
        <rule><inputEntry><text>false</text></inputEntry><outputEntry><text>0.09</text></outputEntry></rule>
      </decisionTable>
    </encapsulatedLogic>
  </businessKnowledgeModel>
  <decisionService id="ds_rate" name="Rate Service">
    <variable name="Rate Service"/>
    <outputDecision href="#d_rate"/>
    <encapsulatedDecision href="#d_adult"/>
    <inputData href="#i_age"/>
  </decisionService>
  <decisionService id="ds_adult" name="Adult Service">
    <variable name="Adult Service"/>
    <outputDecision href="urn:loan#d_adult"/>
    <inputData href="#i_age"/>
  </decisionService>
</definitions>"##;

pub const COMMON: &str = r##"<definitions xmlns="https://www.omg.org/spec/DMN/20191111/MODEL/"
    name="Common" namespace="urn:common">
  <inputData id="i_score" name="Score"><variable name="Score" typeRef="number"/></inputData>
  <decision id="d_good" name="Good Score">
    <informationRequirement><requiredInput href="#i_score"/></informationRequirement>
    <literalExpression><text>Score &gt;= 600</text></literalExpression>
  </decision>
</definitions>"##;

pub const APPROVAL: &str = r##"<definitions xmlns="https://www.omg.org/spec/DMN/20191111/MODEL/"
    name="Approval" namespace="urn:approval">
  <import namespace="urn:common" name="common"/>
  <decision id="d_ok" name="Approved">
    <informationRequirement><requiredDecision href="urn:common#d_good"/></informationRequirement>
    <literalExpression><text>common.Good Score</text></literalExpression>
  </decision>
</definitions>"##;

/// Scratch directory holding model files
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `name` (which may include subdirectories)
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }
}

pub fn executor() -> Executor {
    Executor::new(ExecutorConfig::default())
}

pub fn execute(options: &RunOptions) -> Outcome {
    executor().execute(options)
}
