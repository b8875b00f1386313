mod panels;
mod view;
