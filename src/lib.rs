/// 命令行参数
pub mod cli;

/// 配置文件和默认值
pub mod config;

/// 事件模型：原始事件、输出事件和用到的内核常量
pub mod event_model;

/// 触摸屏输入（evdev）
pub mod input_devices;

/// 设备获取、事件循环、取消和释放
pub mod lifecycle;

/// 绝对坐标到相对位移的翻译
pub mod translator;

/// 虚拟鼠标输出（uinput）
pub mod virtual_pointer;

// 数据只往一个方向流：`input_devices` → `translator` → `virtual_pointer`，
// 由 `lifecycle` 串起来。两个设备和翻译状态都归一个 `Controller` 所有。

// 直接把触摸屏的绝对坐标交给桌面，点击还行，拖动就不对了
// 所以把它当成一块触控板来用：相邻两次绝对坐标的差值就是相对位移
// 除数默认按 16:9 的屏幕来取，别的屏用 --divisor-x / --divisor-y 调

// HACK: 差值除完是 0 的时候也照样发一个 REL 事件，下游会被多唤醒一次
// 先保持原样，以后可能加个开关

// 多点触控、手势、加速度曲线都不做
