// Domain layer: Singer 訊息模型與對外介面 (ports)，不依賴檔案系統。

pub mod model;
pub mod ports;
