//! 声明依赖图的静态检查
//!
//! 只有 `InjectedFactory` 声明了依赖；运行时自行解析的工厂在图中视为叶子。

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::error::ContainerError;

/// 单个绑定在图中的描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphNode {
    Value,
    Factory {
        service_type: &'static str,
        /// `None` 表示依赖在运行时才知道
        dependencies: Option<Vec<String>>,
    },
}

/// 绑定表快照
#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, GraphNode>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl DependencyGraph {
    pub(crate) fn add_value(&mut self, name: &str) {
        self.nodes.insert(name.to_string(), GraphNode::Value);
    }

    pub(crate) fn add_factory(
        &mut self,
        name: &str,
        service_type: &'static str,
        dependencies: Option<Vec<String>>,
    ) {
        self.nodes.insert(
            name.to_string(),
            GraphNode::Factory {
                service_type,
                dependencies,
            },
        );
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &GraphNode)> {
        self.nodes.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn get(&self, name: &str) -> Option<&GraphNode> {
        self.nodes.get(name)
    }

    fn declared(&self, name: &str) -> &[String] {
        match self.nodes.get(name) {
            Some(GraphNode::Factory {
                dependencies: Some(deps),
                ..
            }) => deps,
            _ => &[],
        }
    }

    /// 检查未绑定的依赖与声明环
    ///
    /// 名称按字典序遍历，报告的第一个问题是确定的。
    pub fn validate(&self) -> Result<(), ContainerError> {
        for name in self.nodes.keys() {
            if let Some(missing) = self.declared(name).iter().find(|d| !self.nodes.contains_key(*d)) {
                return Err(ContainerError::UnknownDependency(missing.clone()));
            }
        }

        let mut marks = HashMap::new();
        let mut stack = Vec::new();
        for name in self.nodes.keys() {
            if let Some(cycle) = self.visit(name, &mut marks, &mut stack) {
                return Err(ContainerError::CyclicDependency { path: cycle });
            }
        }
        Ok(())
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        match marks.get(name) {
            Some(Mark::Done) => return None,
            Some(Mark::Visiting) => {
                let start = stack.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(name.to_string());
                return Some(cycle);
            }
            None => {}
        }

        marks.insert(name, Mark::Visiting);
        stack.push(name);
        for dep in self.declared(name) {
            if let Some(cycle) = self.visit(dep, marks, stack) {
                return Some(cycle);
            }
        }
        stack.pop();
        marks.insert(name, Mark::Done);
        None
    }

    /// 声明依赖的拓扑顺序（依赖在前），图有问题时返回错误
    pub fn initialization_order(&self) -> Result<Vec<String>, ContainerError> {
        self.validate()?;

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut marks = HashMap::new();
        for name in self.nodes.keys() {
            self.post_order(name, &mut marks, &mut order);
        }
        Ok(order)
    }

    fn post_order<'a>(&'a self, name: &'a str, marks: &mut HashMap<&'a str, Mark>, order: &mut Vec<String>) {
        if marks.contains_key(name) {
            return;
        }
        marks.insert(name, Mark::Visiting);
        for dep in self.declared(name) {
            self.post_order(dep, marks, order);
        }
        marks.insert(name, Mark::Done);
        order.push(name.to_string());
    }
}
