pub mod event;

pub use event::{EventCategory, OutputEvent, RawEvent};

/// `linux/input-event-codes.h` 里用到的几个常量
pub mod codes {
    pub const BTN_LEFT: u16 = 0x110;
    pub const BTN_TOUCH: u16 = 0x14a;

    pub const ABS_X: u16 = 0x00;
    pub const ABS_Y: u16 = 0x01;

    pub const REL_X: u16 = 0x00;
    pub const REL_Y: u16 = 0x01;

    pub const SYN_REPORT: u16 = 0x00;

    pub const BUS_USB: u16 = 0x03;
}
