pub mod batch_predict;
pub mod label_txt;
