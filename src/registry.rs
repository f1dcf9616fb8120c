//! 模拟器实例注册表
//!
//! 按标识符查找或创建模拟器实例。空标识符指向共享实例。
//! 注册表自身的锁只保证查找-创建的原子性；每个实例各有一把锁，
//! 一个动作（包括 RUN 的全部迭代）在该锁内完成。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::cpu::Effect;
use crate::simulator::{Action, SimStatus, Simulator};

/// 共享的模拟器句柄
pub type SharedSimulator = Arc<Mutex<Simulator>>;

/// 新实例的构造函数
pub type SimulatorFactory = Box<dyn Fn() -> Simulator + Send + Sync>;

/// 边界层的动作分派错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("{action} is disabled while {status}")]
    Disabled { action: Action, status: SimStatus },
}

/// 模拟器注册表
pub struct SimulatorRegistry {
    shared_id: String,
    factory: SimulatorFactory,
    sims: Mutex<HashMap<String, SharedSimulator>>,
}

impl SimulatorRegistry {
    /// 创建注册表
    ///
    /// `factory` 在某个标识符第一次出现时调用一次。
    pub fn new(
        shared_id: impl Into<String>,
        factory: impl Fn() -> Simulator + Send + Sync + 'static,
    ) -> Self {
        Self {
            shared_id: shared_id.into(),
            factory: Box::new(factory),
            sims: Mutex::new(HashMap::new()),
        }
    }

    pub fn shared_id(&self) -> &str {
        &self.shared_id
    }

    /// 查找或创建实例，空标识符表示共享实例
    pub fn get_or_create(&self, id: &str) -> SharedSimulator {
        let id = if id.is_empty() { self.shared_id.as_str() } else { id };
        let mut sims = self.sims.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(sim) = sims.get(id) {
            return Arc::clone(sim);
        }
        log::debug!("creating simulator '{id}'");
        let sim = Arc::new(Mutex::new((self.factory)()));
        sims.insert(id.to_string(), Arc::clone(&sim));
        sim
    }

    /// 共享实例
    pub fn shared(&self) -> SharedSimulator {
        self.get_or_create("")
    }

    /// 已创建的实例数
    pub fn len(&self) -> usize {
        self.sims.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 在实例锁内处理一个动作；当前状态下不可用的动作被拒绝
    pub fn dispatch(&self, id: &str, action: Action) -> Result<Option<Effect>, DispatchError> {
        let sim = self.get_or_create(id);
        let mut sim = lock(&sim);
        if !sim.is_enabled(action) {
            log::debug!("rejected {action} while {}", sim.status());
            return Err(DispatchError::Disabled {
                action,
                status: sim.status(),
            });
        }
        Ok(sim.handle(action))
    }
}

/// 获取实例锁；中毒的锁照常使用
pub fn lock(sim: &SharedSimulator) -> MutexGuard<'_, Simulator> {
    sim.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::MemorySource;
    use std::thread;

    fn registry(lines: &'static [&'static str]) -> SimulatorRegistry {
        SimulatorRegistry::new("shared", move || {
            Simulator::create(MemorySource::new("t.s", lines), 0x1000)
        })
    }

    #[test]
    fn test_empty_id_is_shared() {
        let reg = registry(&["addi x1, x0, 1"]);
        let a = reg.get_or_create("");
        let b = reg.get_or_create("shared");
        let c = reg.shared();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &c));
        assert_eq!(reg.len(), 1);

        let other = reg.get_or_create("other");
        assert!(!Arc::ptr_eq(&a, &other));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_dispatch_rejects_disabled() {
        let reg = registry(&["addi x1, x0, 1"]);
        assert_eq!(
            reg.dispatch("", Action::Stop),
            Err(DispatchError::Disabled {
                action: Action::Stop,
                status: SimStatus::Ready
            })
        );

        let effect = reg.dispatch("", Action::Run).expect("RUN 可用");
        assert!(effect.is_some());
        assert!(matches!(
            reg.dispatch("", Action::Run),
            Err(DispatchError::Disabled { .. })
        ));
        assert!(matches!(
            reg.dispatch("", Action::Reload),
            Err(DispatchError::Disabled { .. })
        ));
        // REFRESH 总是可用
        assert_eq!(reg.dispatch("", Action::Refresh), Ok(effect));
        assert_eq!(reg.dispatch("", Action::Stop), Ok(None));
    }

    #[test]
    fn test_standby_only_reload() {
        let reg = registry(&["# empty"]);
        for action in [Action::Run, Action::Step, Action::Stop] {
            assert!(reg.dispatch("x", action).is_err(), "{action}");
        }
        assert_eq!(reg.dispatch("x", Action::Reload), Ok(None));
        assert_eq!(reg.dispatch("x", Action::Refresh), Ok(None));
    }

    #[test]
    fn test_error_message() {
        let err = DispatchError::Disabled {
            action: Action::Step,
            status: SimStatus::Executed,
        };
        assert_eq!(err.to_string(), "STEP is disabled while executed");
    }

    #[test]
    fn test_concurrent_get_or_create() {
        let reg = Arc::new(registry(&["addi x1, x0, 1", "addi x2, x0, 2"]));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let reg = Arc::clone(&reg);
                thread::spawn(move || {
                    let id = format!("sim{}", i % 2);
                    let sim = reg.get_or_create(&id);
                    let _ = reg.dispatch(&id, Action::Step);
                    sim
                })
            })
            .collect();
        let sims: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("线程正常结束"))
            .collect();

        assert_eq!(reg.len(), 2);
        for sim in &sims {
            let id_match = sims.iter().filter(|s| Arc::ptr_eq(s, sim)).count();
            assert_eq!(id_match, 4);
        }
        // 每个实例恰好两条指令，多余的 STEP 被拒绝
        let sim = reg.get_or_create("sim0");
        let sim = lock(&sim);
        assert_eq!(sim.status(), SimStatus::Executed);
        assert_eq!(sim.registers()[2], 2);
    }

    #[test]
    fn test_instances_are_independent() {
        let reg = registry(&["addi x1, x0, 1"]);
        reg.dispatch("a", Action::Run).expect("可用");
        let b = reg.get_or_create("b");
        let b = lock(&b);
        assert_eq!(b.status(), SimStatus::Ready);
        assert_eq!(b.registers()[1], 0);
    }
}
