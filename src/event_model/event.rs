use num_enum::{FromPrimitive, IntoPrimitive};

/// 内核 `input_event.type` 的分类
///
/// 不认识的类型原样保存在 `Other` 里，透传的时候不能丢掉原始数值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum EventCategory {
    Synchronization = 0x00,
    Key = 0x01,
    RelativeMotion = 0x02,
    AbsolutePosition = 0x03,
    #[num_enum(catch_all)]
    Other(u16),
}

/// 触摸屏读出来的一条原始事件，时间戳不要
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub category: EventCategory,
    pub code: u16,
    pub value: i32,
}

/// 写给虚拟鼠标的一条事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputEvent {
    pub category: EventCategory,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    pub fn new(category: EventCategory, code: u16, value: i32) -> Self {
        Self {
            category,
            code,
            value,
        }
    }

    /// 从内核的 (type, code, value) 三元组构造
    pub fn from_raw(event_type: u16, code: u16, value: i32) -> Self {
        Self::new(EventCategory::from(event_type), code, value)
    }

    /// 原封不动地转成输出事件
    pub fn pass_through(self) -> OutputEvent {
        OutputEvent::new(self.category, self.code, self.value)
    }
}

impl OutputEvent {
    pub fn new(category: EventCategory, code: u16, value: i32) -> Self {
        Self {
            category,
            code,
            value,
        }
    }

    pub fn key(code: u16, value: i32) -> Self {
        Self::new(EventCategory::Key, code, value)
    }

    pub fn relative(code: u16, value: i32) -> Self {
        Self::new(EventCategory::RelativeMotion, code, value)
    }

    /// 内核的 type 数值
    pub fn event_type(&self) -> u16 {
        self.category.into()
    }
}
