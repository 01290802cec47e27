mod part_file;

pub use self::part_file::PartFile;
