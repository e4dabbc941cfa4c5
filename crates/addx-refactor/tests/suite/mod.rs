mod fixture;

mod apply;
mod candidates;
mod locate;
mod rejections;
