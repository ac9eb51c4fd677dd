pub mod video_list;
