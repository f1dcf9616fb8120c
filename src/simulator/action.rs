//! 控制动作与状态

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// 控制动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// 连续执行直到程序结束或超时
    Run,
    /// 单步执行
    Step,
    /// 复位到入口
    Stop,
    /// 重新读取并装载源文件
    Reload,
    /// 返回上一次的效果，不改变状态
    Refresh,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Run,
        Action::Step,
        Action::Stop,
        Action::Reload,
        Action::Refresh,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Run => "RUN",
            Action::Step => "STEP",
            Action::Stop => "STOP",
            Action::Reload => "RELOAD",
            Action::Refresh => "REFRESH",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 无法识别的动作名
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action({0})")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
    type Err = ParseActionError;

    /// 不区分大小写；空串视为 REFRESH
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Action::Refresh);
        }
        Action::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseActionError(s.to_string()))
    }
}

/// 模拟器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimStatus {
    /// 没有可执行的程序
    Standby,
    /// 已装载，PC 位于入口
    Ready,
    /// 执行中（单步中或 RUN 超时）
    Running,
    /// 执行完毕
    Executed,
}

impl SimStatus {
    /// 本状态下可用的动作
    pub fn enabled_actions(self) -> EnabledActions {
        let (run, step, stop, reload) = match self {
            SimStatus::Standby => (false, false, false, true),
            SimStatus::Ready => (true, true, false, true),
            SimStatus::Running => (true, true, true, false),
            SimStatus::Executed => (false, false, true, false),
        };
        EnabledActions { run, step, stop, reload }
    }
}

impl fmt::Display for SimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SimStatus::Standby => "standby",
            SimStatus::Ready => "ready",
            SimStatus::Running => "running",
            SimStatus::Executed => "executed",
        };
        f.write_str(s)
    }
}

/// 可用动作集合，REFRESH 始终可用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnabledActions {
    pub run: bool,
    pub step: bool,
    pub stop: bool,
    pub reload: bool,
}

impl EnabledActions {
    pub fn contains(&self, action: Action) -> bool {
        match action {
            Action::Run => self.run,
            Action::Step => self.step,
            Action::Stop => self.stop,
            Action::Reload => self.reload,
            Action::Refresh => true,
        }
    }

    /// 按固定顺序列出可用动作
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL.into_iter().filter(|a| self.contains(*a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action() {
        assert_eq!("run".parse::<Action>(), Ok(Action::Run));
        assert_eq!("STEP".parse::<Action>(), Ok(Action::Step));
        assert_eq!("Stop".parse::<Action>(), Ok(Action::Stop));
        assert_eq!(" reload ".parse::<Action>(), Ok(Action::Reload));
        assert_eq!("refresh".parse::<Action>(), Ok(Action::Refresh));
        assert_eq!("".parse::<Action>(), Ok(Action::Refresh));
        assert_eq!(
            "start".parse::<Action>(),
            Err(ParseActionError("start".into()))
        );
        assert_eq!(Action::Reload.to_string(), "RELOAD");
    }

    #[test]
    fn test_enabled_table() {
        use Action::*;
        let cases = [
            (SimStatus::Standby, vec![Reload, Refresh]),
            (SimStatus::Ready, vec![Run, Step, Reload, Refresh]),
            (SimStatus::Running, vec![Run, Step, Stop, Refresh]),
            (SimStatus::Executed, vec![Stop, Refresh]),
        ];
        for (status, want) in cases {
            let got: Vec<_> = status.enabled_actions().iter().collect();
            assert_eq!(got, want, "{status}");
        }
    }
}
