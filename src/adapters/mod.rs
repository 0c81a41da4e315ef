// 對外部資料來源的實作：本地檔案、調查點字表、工作簿、簡稱表、字形轉換詞典

pub mod abbreviations;
pub mod script;
pub mod storage;
pub mod survey;
pub mod workbook;

pub use storage::LocalStorage;
