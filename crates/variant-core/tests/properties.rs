//! 可配置值的性质验证。
//!
//! # 概览
//!
//! - **核心目标 (Why)**：用随机操作序列驱动 `ConfigurableValue`，同时维护一个以 `BTreeMap` 表达的影子模型，
//!   逐步比对二者，确认“任意 ID 都有定义的值”“重置即回退”“覆盖即生效”“数量与枚举一致”“枚举严格升序”
//!   “重复重置无副作用”“替换默认值不影响覆盖项”这些性质在任意合法序列下成立。
//! - **设计手法 (How)**：`Op` 为输入事件；`Model` 为影子实现；`check_consistency` 在每一步后比对全部可观察结果，
//!   并以 [`Violation`] 给出具体的失配说明。
//!
//! # 合同与边界 (What)
//!
//! - ID 取自 `cfg-00`..`cfg-07` 的小空间，确保序列中频繁命中已有覆盖项；零填充保证字典序即数值序。
//! - 值取自 `0..4`，让“多个 ID 同值”的反查分支被充分覆盖。

use std::collections::BTreeMap;

use proptest::prelude::*;
use variant_core::{ConfigurableErrorKind, ConfigurableValue, ConfigurationId};

const ID_SPACE: u8 = 8;

fn cfg(n: u8) -> ConfigurationId {
    ConfigurationId::from(format!("cfg-{n:02}"))
}

#[derive(Clone, Debug)]
enum Op {
    Set(u8, u8),
    Reset(u8),
    SetDefault(u8),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..ID_SPACE, 0u8..4).prop_map(|(id, value)| Op::Set(id, value)),
        3 => (0..ID_SPACE).prop_map(Op::Reset),
        2 => (0u8..4).prop_map(Op::SetDefault),
        1 => Just(Op::Clear),
    ]
}

/// 影子模型：最直白的默认值 + 有序映射实现。
#[derive(Debug)]
struct Model {
    default: u8,
    overrides: BTreeMap<u8, u8>,
}

impl Model {
    fn apply(&mut self, op: &Op) {
        match *op {
            Op::Set(id, value) => {
                self.overrides.insert(id, value);
            }
            Op::Reset(id) => {
                self.overrides.remove(&id);
            }
            Op::SetDefault(value) => self.default = value,
            Op::Clear => self.overrides.clear(),
        }
    }

    fn get(&self, id: u8) -> u8 {
        self.overrides.get(&id).copied().unwrap_or(self.default)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
enum Violation {
    #[error("get({id}) returned {actual}, model expects {expected}")]
    Value { id: u8, actual: u8, expected: u8 },
    #[error("is_default({id}) disagrees with the model")]
    DefaultFlag { id: u8 },
    #[error("size {size} differs from {ids} enumerated ids")]
    SizeMismatch { size: usize, ids: usize },
    #[error("enumerated ids are not strictly ascending")]
    Unsorted,
    #[error("reverse lookup of {value} is inconsistent with the model")]
    ReverseLookup { value: u8 },
}

fn apply(value: &mut ConfigurableValue<u8>, op: &Op) {
    match *op {
        Op::Set(id, v) => value.set(cfg(id), v).expect("present arguments are accepted"),
        Op::Reset(id) => {
            value.reset(&cfg(id));
        }
        Op::SetDefault(v) => value.set_default(v).expect("present default is accepted"),
        Op::Clear => {
            value.clear_overrides();
        }
    }
}

fn check_consistency(value: &ConfigurableValue<u8>, model: &Model) -> Result<(), Violation> {
    for id in 0..ID_SPACE {
        let actual = *value.get(&cfg(id));
        let expected = model.get(id);
        if actual != expected {
            return Err(Violation::Value {
                id,
                actual,
                expected,
            });
        }
        if value.is_default(&cfg(id)) == model.overrides.contains_key(&id) {
            return Err(Violation::DefaultFlag { id });
        }
    }

    let ids = value.sorted_configuration_ids();
    if value.size() != ids.len() || ids.len() != model.overrides.len() {
        return Err(Violation::SizeMismatch {
            size: value.size(),
            ids: ids.len(),
        });
    }
    if ids.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(Violation::Unsorted);
    }

    for probe in 0u8..4 {
        let expected = model
            .overrides
            .iter()
            .find(|(_, v)| **v == probe)
            .map(|(id, _)| cfg(*id));
        let actual = value.find_id(&probe).ok().cloned();
        if actual != expected {
            return Err(Violation::ReverseLookup { value: probe });
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// 任意合法操作序列下，实现与影子模型的全部可观察结果一致。
    #[test]
    fn prop_matches_shadow_model(initial in 0u8..4, ops in prop::collection::vec(op(), 0..64)) {
        let mut value = ConfigurableValue::new(initial);
        let mut model = Model { default: initial, overrides: BTreeMap::new() };

        for op in &ops {
            apply(&mut value, op);
            model.apply(op);
            prop_assert_eq!(check_consistency(&value, &model), Ok(()));
        }
    }

    /// 重置后读取回退到默认值，且重复重置不改变任何可观察结果。
    #[test]
    fn prop_reset_is_idempotent(ops in prop::collection::vec(op(), 0..32), target in 0..ID_SPACE) {
        let mut value = ConfigurableValue::new(0u8);
        for op in &ops {
            apply(&mut value, op);
        }

        value.reset(&cfg(target));
        let ids_after_first = value.sorted_configuration_ids();
        let sequence_after_first = value.change_sequence();
        prop_assert_eq!(*value.get(&cfg(target)), *value.default_value());
        prop_assert!(value.is_default(&cfg(target)));

        prop_assert!(!value.reset(&cfg(target)));
        prop_assert_eq!(value.sorted_configuration_ids(), ids_after_first);
        prop_assert_eq!(value.change_sequence(), sequence_after_first);
    }

    /// 写入覆盖项后立即可读，无论之前的状态如何。
    #[test]
    fn prop_set_round_trips(ops in prop::collection::vec(op(), 0..32), target in 0..ID_SPACE, v in 0u8..4) {
        let mut value = ConfigurableValue::new(0u8);
        for op in &ops {
            apply(&mut value, op);
        }

        value.set(cfg(target), v).expect("present arguments are accepted");
        prop_assert_eq!(*value.get(&cfg(target)), v);
        prop_assert!(!value.is_default(&cfg(target)));
    }

    /// 替换默认值不会改变已有覆盖项的读取结果。
    #[test]
    fn prop_default_replacement_keeps_overrides(ops in prop::collection::vec(op(), 0..32), new_default in 0u8..4) {
        let mut value = ConfigurableValue::new(0u8);
        for op in &ops {
            apply(&mut value, op);
        }
        let before: Vec<(ConfigurationId, u8)> =
            value.iter().map(|(id, v)| (id.clone(), *v)).collect();

        value.set_default(new_default).expect("present default is accepted");
        for (id, v) in &before {
            prop_assert_eq!(*value.get(id), *v);
        }
        prop_assert_eq!(value.size(), before.len());
    }
}

#[test]
fn absent_value_keeps_model_state() {
    let mut value = ConfigurableValue::new(1u8);
    value.set(cfg(1), 2u8).expect("set override");

    let err = value.set(cfg(2), None::<u8>).expect_err("absent value is rejected");
    assert_eq!(err.kind(), ConfigurableErrorKind::InvalidArgument);
    assert_eq!(value.sorted_configuration_ids(), vec![cfg(1)]);
}
