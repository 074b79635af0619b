//! 等待图
//!
//! 每次工厂执行都是一个独立的帧；顶层调用方也各自是一个帧。按名称加锁后，
//! 帧之间可能互相等待：X 构建 A 并等待 B，Y 构建 B 并等待 A；同一个工厂里
//! 并发启动的两个分支也可能互相等待。这里记录 "哪个帧在构建哪个名称" 与
//! "哪个帧在等待哪些名称"，阻塞前从被等待名称的构建者出发搜索，看能否回到自己。
//!
//! 每一方都先发布自己的状态再检查别人的状态，所以环上最后一个进入等待的
//! 帧一定能看到完整的环。

use dashmap::DashMap;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Default)]
pub(crate) struct InFlight {
    /// 名称 -> 正在运行其工厂的帧
    builders: DashMap<String, Uuid>,
    /// 帧 -> 正在等待的名称（同一帧可并发等待多个名称）
    waiting: DashMap<Uuid, Vec<String>>,
}

impl InFlight {
    /// 标记帧 `frame` 开始构建 `name`
    pub(crate) fn begin_build<'a>(&'a self, name: &'a str, frame: Uuid) -> BuildGuard<'a> {
        self.builders.insert(name.to_string(), frame);
        BuildGuard {
            in_flight: self,
            name,
            frame,
        }
    }

    /// 标记帧 `frame` 即将等待 `name`
    pub(crate) fn begin_wait<'a>(&'a self, frame: Uuid, name: &'a str) -> WaitGuard<'a> {
        self.waiting.entry(frame).or_default().push(name.to_string());
        WaitGuard {
            in_flight: self,
            name,
            frame,
        }
    }

    /// 从 `name` 的构建者出发沿等待关系搜索，找到回到 `frame` 的环
    ///
    /// `building` 是 `frame` 正在构建的名称；顶层帧不构建任何名称，不可能闭合环。
    /// 返回的路径以 `building` 开始并以它结束。
    pub(crate) fn find_cycle(&self, frame: Uuid, building: Option<&str>, name: &str) -> Option<Vec<String>> {
        let building = building?;
        let mut visited = HashSet::new();
        let mut chain = vec![building.to_string()];
        if self.search(frame, name, &mut chain, &mut visited) {
            Some(chain)
        } else {
            None
        }
    }

    fn search(&self, frame: Uuid, name: &str, chain: &mut Vec<String>, visited: &mut HashSet<Uuid>) -> bool {
        chain.push(name.to_string());

        // 只复制出数据，不在持有分片锁时访问其他键
        let owner = self.builders.get(name).map(|entry| *entry.value());
        if let Some(owner) = owner {
            if owner == frame {
                return true;
            }
            if visited.insert(owner) {
                let next: Vec<String> = self
                    .waiting
                    .get(&owner)
                    .map(|entry| entry.value().clone())
                    .unwrap_or_default();
                for next_name in next {
                    if self.search(frame, &next_name, chain, visited) {
                        return true;
                    }
                }
            }
        }

        chain.pop();
        false
    }

    #[cfg(test)]
    fn is_idle(&self) -> bool {
        self.builders.is_empty() && self.waiting.is_empty()
    }
}

pub(crate) struct BuildGuard<'a> {
    in_flight: &'a InFlight,
    name: &'a str,
    frame: Uuid,
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        let frame = self.frame;
        self.in_flight.builders.remove_if(self.name, |_, owner| *owner == frame);
    }
}

pub(crate) struct WaitGuard<'a> {
    in_flight: &'a InFlight,
    name: &'a str,
    frame: Uuid,
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        if let Some(mut names) = self.in_flight.waiting.get_mut(&self.frame) {
            if let Some(pos) = names.iter().position(|n| n == self.name) {
                names.swap_remove(pos);
            }
        }
        self.in_flight.waiting.remove_if(&self.frame, |_, names| names.is_empty());
    }
}
