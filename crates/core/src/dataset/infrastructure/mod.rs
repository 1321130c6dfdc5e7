pub mod dataset_factory;
pub mod folder_dataset;
pub mod video_dataset;
