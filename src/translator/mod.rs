//! 绝对坐标 → 相对位移
//!
//! 触摸屏只报告绝对位置，而我们要喂给系统的是一只普通鼠标，
//! 所以记住上一次的坐标，用两次采样的差值来移动光标。
//! 按下/抬起 (`BTN_TOUCH`) 被映射成左键，并清空坐标记录，
//! 否则下一次接触会带着上一次的旧坐标，光标会猛跳一下。

use tracing::trace;

use crate::config::ConfigError;
use crate::event_model::{EventCategory, OutputEvent, RawEvent, codes};

/// 两个轴的缩放除数
///
/// 默认值假设屏幕是 16:9 的
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divisors {
    x: i32,
    y: i32,
}

impl Divisors {
    pub const DEFAULT_X: i32 = 16;
    pub const DEFAULT_Y: i32 = 9;

    pub fn new(x: i32, y: i32) -> Result<Self, ConfigError> {
        if x == 0 {
            return Err(ConfigError::ZeroDivisor { axis: 'x' });
        }
        if y == 0 {
            return Err(ConfigError::ZeroDivisor { axis: 'y' });
        }
        Ok(Self { x, y })
    }
}

impl Default for Divisors {
    fn default() -> Self {
        Self {
            x: Self::DEFAULT_X,
            y: Self::DEFAULT_Y,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationState {
    pub last_x: Option<i32>,
    pub last_y: Option<i32>,
}

impl TranslationState {
    /// 处理一条原始事件，返回新状态和至多一条输出
    ///
    /// 差值为 0 的位移也照样输出，不做过滤
    pub fn step(self, event: RawEvent, divisors: &Divisors) -> (Self, Option<OutputEvent>) {
        match (event.category, event.code) {
            (EventCategory::Key, codes::BTN_TOUCH) => (
                Self::default(),
                Some(OutputEvent::key(codes::BTN_LEFT, event.value)),
            ),
            (EventCategory::AbsolutePosition, codes::ABS_X) => {
                let motion = relative(codes::REL_X, self.last_x, event.value, divisors.x);
                (
                    Self {
                        last_x: Some(event.value),
                        ..self
                    },
                    motion,
                )
            }
            (EventCategory::AbsolutePosition, codes::ABS_Y) => {
                let motion = relative(codes::REL_Y, self.last_y, event.value, divisors.y);
                (
                    Self {
                        last_y: Some(event.value),
                        ..self
                    },
                    motion,
                )
            }
            _ => (self, Some(event.pass_through())),
        }
    }

    pub fn is_reset(&self) -> bool {
        self.last_x.is_none() && self.last_y.is_none()
    }
}

fn relative(code: u16, last: Option<i32>, value: i32, divisor: i32) -> Option<OutputEvent> {
    last.map(|last| {
        // 在 i64 里算，差值不会溢出；只有商超出 i32 时才截到边界
        let delta = (i64::from(last) - i64::from(value)) / i64::from(divisor);
        let delta = delta.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        OutputEvent::relative(code, delta)
    })
}

/// 持有状态的翻译器，整个运行期间只有一个
#[derive(Debug, Default)]
pub struct Translator {
    divisors: Divisors,
    state: TranslationState,
}

impl Translator {
    pub fn new(divisors: Divisors) -> Self {
        Self {
            divisors,
            state: TranslationState::default(),
        }
    }

    pub fn translate(&mut self, event: RawEvent) -> Option<OutputEvent> {
        let (state, output) = self.state.step(event, &self.divisors);
        trace!(?event, ?output, "translate");
        self.state = state;
        output
    }

    pub fn state(&self) -> &TranslationState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(value: i32) -> RawEvent {
        RawEvent::new(EventCategory::Key, codes::BTN_TOUCH, value)
    }

    fn abs_x(value: i32) -> RawEvent {
        RawEvent::new(EventCategory::AbsolutePosition, codes::ABS_X, value)
    }

    fn abs_y(value: i32) -> RawEvent {
        RawEvent::new(EventCategory::AbsolutePosition, codes::ABS_Y, value)
    }

    fn run(translator: &mut Translator, events: &[RawEvent]) -> Vec<OutputEvent> {
        events
            .iter()
            .filter_map(|&event| translator.translate(event))
            .collect()
    }

    #[test]
    fn tap_and_drag() {
        let mut translator = Translator::default();
        let output = run(
            &mut translator,
            &[
                touch(1),
                abs_x(100),
                abs_y(200),
                abs_x(84),
                abs_y(191),
                touch(0),
            ],
        );

        assert_eq!(
            output,
            vec![
                OutputEvent::key(codes::BTN_LEFT, 1),
                OutputEvent::relative(codes::REL_X, 1),
                OutputEvent::relative(codes::REL_Y, 1),
                OutputEvent::key(codes::BTN_LEFT, 0),
            ]
        );
        assert!(translator.state().is_reset());
    }

    #[test]
    fn horizontal_sequence_uses_previous_sample() {
        let mut translator = Translator::default();
        let output = run(&mut translator, &[abs_x(500), abs_x(468), abs_x(532), abs_x(500)]);

        assert_eq!(
            output,
            vec![
                OutputEvent::relative(codes::REL_X, 2),
                OutputEvent::relative(codes::REL_X, -4),
                OutputEvent::relative(codes::REL_X, 2),
            ]
        );
        assert_eq!(translator.state().last_x, Some(500));
        assert_eq!(translator.state().last_y, None);
    }

    #[test]
    fn small_delta_still_emits_zero_motion() {
        let mut translator = Translator::default();
        let output = run(&mut translator, &[abs_x(10), abs_x(11), abs_y(10), abs_y(2)]);

        assert_eq!(
            output,
            vec![
                OutputEvent::relative(codes::REL_X, 0),
                OutputEvent::relative(codes::REL_Y, 0),
            ]
        );
    }

    #[test]
    fn division_truncates_toward_zero() {
        let state = TranslationState {
            last_x: Some(0),
            last_y: None,
        };
        // (0 - 31) / 16 = -1
        let (_, output) = state.step(abs_x(31), &Divisors::default());
        assert_eq!(output, Some(OutputEvent::relative(codes::REL_X, -1)));
    }

    #[test]
    fn extreme_coordinates_keep_the_full_difference() {
        let state = TranslationState {
            last_x: Some(i32::MAX),
            last_y: Some(i32::MIN),
        };
        let divisors = Divisors::new(2, -1).unwrap();

        // (MAX - MIN) / 2 = MAX，不能先把差值截到 MAX 再除
        let (state, output) = state.step(abs_x(i32::MIN), &divisors);
        assert_eq!(output, Some(OutputEvent::relative(codes::REL_X, i32::MAX)));

        // (MIN - MAX) / -1 超出 i32，截到 MAX
        let (_, output) = state.step(abs_y(i32::MAX), &divisors);
        assert_eq!(output, Some(OutputEvent::relative(codes::REL_Y, i32::MAX)));
    }

    #[test]
    fn touch_release_resets_both_axes() {
        let state = TranslationState {
            last_x: Some(7),
            last_y: Some(9),
        };
        let (state, output) = state.step(touch(0), &Divisors::default());

        assert!(state.is_reset());
        assert_eq!(output, Some(OutputEvent::key(codes::BTN_LEFT, 0)));
    }

    #[test]
    fn new_contact_does_not_jump() {
        let mut translator = Translator::default();
        let output = run(
            &mut translator,
            &[abs_x(100), touch(0), touch(1), abs_x(4000)],
        );

        assert_eq!(
            output,
            vec![
                OutputEvent::key(codes::BTN_LEFT, 0),
                OutputEvent::key(codes::BTN_LEFT, 1),
            ]
        );
        assert_eq!(translator.state().last_x, Some(4000));
    }

    #[test]
    fn everything_else_passes_through() {
        let mut translator = Translator::default();
        let events = [
            RawEvent::new(EventCategory::Synchronization, codes::SYN_REPORT, 0),
            // BTN_TOOL_FINGER
            RawEvent::new(EventCategory::Key, 0x145, 1),
            // ABS_PRESSURE
            RawEvent::new(EventCategory::AbsolutePosition, 0x18, 30),
            RawEvent::new(EventCategory::Other(0x04), 0x05, 12345),
        ];
        let output = run(&mut translator, &events);

        let expected: Vec<_> = events.iter().map(|e| e.pass_through()).collect();
        assert_eq!(output, expected);
        assert!(translator.state().is_reset());
    }

    #[test]
    fn custom_divisors() {
        let mut translator = Translator::new(Divisors::new(4, 3).unwrap());
        let output = run(&mut translator, &[abs_x(0), abs_x(-8), abs_y(0), abs_y(9)]);

        assert_eq!(
            output,
            vec![
                OutputEvent::relative(codes::REL_X, 2),
                OutputEvent::relative(codes::REL_Y, -3),
            ]
        );
    }

    #[test]
    fn zero_divisor_is_rejected() {
        assert!(matches!(
            Divisors::new(0, 9),
            Err(ConfigError::ZeroDivisor { axis: 'x' })
        ));
        assert!(matches!(
            Divisors::new(16, 0),
            Err(ConfigError::ZeroDivisor { axis: 'y' })
        ));
    }
}
