pub mod link_previews;
pub mod tweet_images;
pub mod tweets;
