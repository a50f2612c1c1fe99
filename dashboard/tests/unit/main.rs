mod test_log_stream;
mod test_project_list;
mod test_realtime;
mod test_wizard;
