// 运行状态模块

mod result_map;

pub use result_map::ResultMap;
