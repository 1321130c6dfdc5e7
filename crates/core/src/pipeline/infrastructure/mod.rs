pub mod image_dump_sink;
pub mod timestamp_log_sink;
