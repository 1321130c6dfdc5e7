pub mod dataset {
    pub mod domain {
        pub mod dataset;
        pub mod dataset_config;
        pub mod dataset_error;
        pub mod timestamps;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod feed_frames_use_case;
    pub mod frame_sink;
    pub mod infrastructure;
    pub mod pipeline_logger;
}

pub mod shared {
    pub mod constants;
    pub mod frame;
    pub mod video_metadata;
}

pub mod video {
    pub mod domain {
        pub mod image_reader;
        pub mod image_writer;
        pub mod video_reader;
    }
    pub mod infrastructure {
        pub mod ffmpeg_reader;
        pub mod image_file_reader;
        pub mod image_file_writer;
        #[cfg(test)]
        pub(crate) mod test_video;
    }
}
